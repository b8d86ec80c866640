//! Menu bars
//!
//! Menus list the visible actions of contributing managed beans. Building
//! them fully introspects those beans and loads the types their actions
//! return, which is why `create_meta_model` builds the menus before fully
//! introspecting domain objects.

use crate::loader::SpecificationLoader;
use crate::spec::MixedIn;
use causeway_core::{IntrospectionState, MetamodelResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One menu: a managed bean and its actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Logical type name of the bean
    pub logical_type_name: String,
    /// Action ids, in declaration order
    pub actions: Vec<String>,
}

/// All menus, ordered by logical type name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuBars {
    /// Menus
    pub menus: Vec<Menu>,
}

impl MenuBars {
    /// Menu of the bean with `logical_type_name`
    pub fn menu(&self, logical_type_name: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.logical_type_name == logical_type_name)
    }
}

/// Builds and memoizes the menu bars
pub trait MenuBarsService: Send + Sync {
    /// Menu bars, built on first call
    fn menu_bars(&self, loader: &dyn SpecificationLoader) -> MetamodelResult<Arc<MenuBars>>;

    /// Drop the memoized menu bars
    fn invalidate(&self);
}

/// Menus derived from contributing managed beans
#[derive(Debug, Default)]
pub struct MenuBarsServiceDefault {
    memo: Mutex<Option<Arc<MenuBars>>>,
}

impl MenuBarsServiceDefault {
    /// Service with nothing built yet
    pub fn new() -> Self {
        Self::default()
    }

    fn build(loader: &dyn SpecificationLoader) -> MetamodelResult<MenuBars> {
        let mut menus = Vec::new();
        for spec in loader.snapshot_specifications() {
            if !spec.bean_sort().is_managed_bean_contributing() {
                continue;
            }
            let mut actions = Vec::new();
            for action in spec.actions(MixedIn::Included)? {
                if let Some(class) = loader.class_path().resolve(action.return_type()) {
                    loader.load_specification(&class, IntrospectionState::TypeIntrospected)?;
                }
                actions.push(action.id().to_string());
            }
            menus.push(Menu {
                logical_type_name: spec.logical_type_name().to_string(),
                actions,
            });
        }
        menus.sort_by(|a, b| a.logical_type_name.cmp(&b.logical_type_name));
        debug!(target: "causeway::metamodel", menus = menus.len(), "Menu bars built");
        Ok(MenuBars { menus })
    }
}

impl MenuBarsService for MenuBarsServiceDefault {
    fn menu_bars(&self, loader: &dyn SpecificationLoader) -> MetamodelResult<Arc<MenuBars>> {
        if let Some(memo) = self.memo.lock().as_ref() {
            return Ok(Arc::clone(memo));
        }
        let built = Arc::new(Self::build(loader)?);
        *self.memo.lock() = Some(Arc::clone(&built));
        Ok(built)
    }

    fn invalidate(&self) {
        *self.memo.lock() = None;
    }
}
