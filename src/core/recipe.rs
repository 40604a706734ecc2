//! The serd recipe definition
//!
//! Static facts about the packaged library. Everything that varies per run
//! lives in [`RecipeContext`].

use crate::core::layout::Layout;
use crate::core::settings::{Options, Settings};

/// Descriptive recipe metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: &'static str,
    pub description: &'static str,
    pub homepage: &'static str,
    pub license: &'static str,
    pub topics: &'static [&'static str],
}

/// serd: a lightweight C library for RDF syntax
pub const SERD: Recipe = Recipe {
    name: "serd",
    description: "A lightweight C library for RDF syntax",
    homepage: "https://drobilla.net/software/serd.html",
    license: "ISC",
    topics: &[
        "linked-data",
        "semantic-web",
        "rdf",
        "turtle",
        "trig",
        "ntriples",
        "nquads",
    ],
};

impl Recipe {
    /// Binary library name, also the include subdirectory name.
    pub fn lib_name(&self) -> String {
        format!("{}-0", self.name)
    }
}

/// Per-run inputs passed explicitly to every lifecycle step
#[derive(Debug, Clone)]
pub struct RecipeContext {
    pub version: String,
    pub settings: Settings,
    pub options: Options,
    pub layout: Layout,
}

impl RecipeContext {
    pub fn new(version: impl Into<String>, settings: Settings, options: Options, layout: Layout) -> Self {
        Self {
            version: version.into(),
            settings,
            options,
            layout,
        }
    }
}
