//! In-process class catalog.
//!
//! The [`ClassSource`] used when command classes are declared in code: the
//! embedding plugin adds its declarations at startup and the scanner reads
//! them back filtered by package.

use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::models::declaration::CommandClass;
use crate::domain::ports::ClassSource;

/// Registry of declared classes, in declaration order.
#[derive(Debug, Default)]
pub struct ClassCatalog {
    classes: RwLock<Vec<Arc<CommandClass>>>,
}

impl ClassCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding `classes`.
    pub fn from_classes(classes: impl IntoIterator<Item = CommandClass>) -> Self {
        let catalog = Self::new();
        for class in classes {
            catalog.add(class);
        }
        catalog
    }

    /// Declare a class.
    pub fn add(&self, class: CommandClass) {
        self.classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(class));
    }

    /// Number of declared classes.
    pub fn len(&self) -> usize {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClassSource for ClassCatalog {
    fn classes_under(&self, base_package: &str) -> Vec<Arc<CommandClass>> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|class| class.is_in_package(base_package))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_filters_by_package() {
        let catalog = ClassCatalog::from_classes([
            CommandClass::of::<A>().in_module("plugin::commands"),
            CommandClass::of::<B>().in_module("plugin::util"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.classes_under("").len(), 2);
        assert_eq!(catalog.classes_under("plugin").len(), 2);

        let commands = catalog.classes_under("plugin::commands");
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name(), std::any::type_name::<A>());
    }
}
