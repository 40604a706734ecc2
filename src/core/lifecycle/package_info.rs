//! Metadata exported to package consumers

use crate::core::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// Link and include information for consumers of the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub libs: Vec<String>,
    pub includedirs: Vec<String>,
}

/// Exported metadata. Depends only on the recipe name.
pub fn package_info(recipe: &Recipe) -> PackageInfo {
    let lib_name = recipe.lib_name();
    PackageInfo {
        includedirs: vec![format!("include/{}/", lib_name)],
        libs: vec![lib_name],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::SERD;

    #[test]
    fn test_serd_package_info() {
        let info = package_info(&SERD);
        assert_eq!(info.libs, ["serd-0"]);
        assert_eq!(info.includedirs, ["include/serd-0/"]);
    }

    #[test]
    fn test_package_info_follows_name() {
        let recipe = Recipe {
            name: "sord",
            ..SERD
        };
        let info = package_info(&recipe);
        assert_eq!(info.libs, ["sord-0"]);
        assert_eq!(info.includedirs, ["include/sord-0/"]);
    }
}
