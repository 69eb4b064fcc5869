//! Tab registries for package and module details pages
//!
//! Each namespace has an ordered list of tabs. The list is turned into a
//! name-keyed registry once at startup and only read afterwards. Requests for
//! unknown tab names fall back to a namespace default instead of failing.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use crate::frontend::error::FrontendError;

/// A tab known to a details namespace
pub trait Tab: Copy + Eq + Hash + Debug + Serialize + Send + Sync + 'static {
    /// Name used in the `tab` query parameter
    fn name(&self) -> &'static str;
}

/// Tabs of a package details page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTab {
    Doc,
    Readme,
    Module,
    Versions,
    Imports,
    ImportedBy,
    Licenses,
}

impl Tab for PackageTab {
    fn name(&self) -> &'static str {
        match self {
            PackageTab::Doc => "doc",
            PackageTab::Readme => "readme",
            PackageTab::Module => "module",
            PackageTab::Versions => "versions",
            PackageTab::Imports => "imports",
            PackageTab::ImportedBy => "importedby",
            PackageTab::Licenses => "licenses",
        }
    }
}

/// Tabs of a module details page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleTab {
    Readme,
    Packages,
    Versions,
    Licenses,
}

impl Tab for ModuleTab {
    fn name(&self) -> &'static str {
        match self {
            ModuleTab::Readme => "readme",
            ModuleTab::Packages => "packages",
            ModuleTab::Versions => "versions",
            ModuleTab::Licenses => "licenses",
        }
    }
}

/// Tab-specific display metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSettings<T: Tab> {
    /// The tab; serialized as its URL name
    #[serde(rename = "name")]
    pub tab: T,

    /// Formatted tab name
    pub display_name: &'static str,

    /// Whether the tab content can be shown even if the package or module is
    /// not redistributable
    pub always_show_details: bool,

    /// Template used to render the tab
    pub template_name: &'static str,
}

impl<T: Tab> TabSettings<T> {
    pub fn name(&self) -> &'static str {
        self.tab.name()
    }
}

pub const PACKAGE_TAB_SETTINGS: &[TabSettings<PackageTab>] = &[
    TabSettings {
        tab: PackageTab::Doc,
        display_name: "Doc",
        always_show_details: false,
        template_name: "pkg_doc.tmpl",
    },
    TabSettings {
        tab: PackageTab::Readme,
        display_name: "README",
        always_show_details: false,
        template_name: "readme.tmpl",
    },
    TabSettings {
        tab: PackageTab::Module,
        display_name: "Module",
        always_show_details: true,
        template_name: "module.tmpl",
    },
    TabSettings {
        tab: PackageTab::Versions,
        display_name: "Versions",
        always_show_details: true,
        template_name: "pkg_versions.tmpl",
    },
    TabSettings {
        tab: PackageTab::Imports,
        display_name: "Imports",
        always_show_details: true,
        template_name: "pkg_imports.tmpl",
    },
    TabSettings {
        tab: PackageTab::ImportedBy,
        display_name: "Imported By",
        always_show_details: true,
        template_name: "pkg_importedby.tmpl",
    },
    TabSettings {
        tab: PackageTab::Licenses,
        display_name: "Licenses",
        always_show_details: false,
        template_name: "licenses.tmpl",
    },
];

pub const MODULE_TAB_SETTINGS: &[TabSettings<ModuleTab>] = &[
    TabSettings {
        tab: ModuleTab::Readme,
        display_name: "README",
        always_show_details: false,
        template_name: "readme.tmpl",
    },
    TabSettings {
        tab: ModuleTab::Packages,
        display_name: "Packages",
        always_show_details: true,
        template_name: "module.tmpl",
    },
    TabSettings {
        tab: ModuleTab::Versions,
        display_name: "Versions",
        always_show_details: true,
        template_name: "not_implemented.tmpl",
    },
    TabSettings {
        tab: ModuleTab::Licenses,
        display_name: "Licenses",
        always_show_details: false,
        template_name: "licenses.tmpl",
    },
];

/// Name-keyed, ordered lookup of the tabs of one namespace
#[derive(Debug, Clone)]
pub struct TabRegistry<T: Tab> {
    tabs: IndexMap<&'static str, TabSettings<T>>,
}

impl<T: Tab> TabRegistry<T> {
    /// Build a registry, rejecting duplicate tab names
    pub fn new(settings: &[TabSettings<T>]) -> Result<Self, FrontendError> {
        let mut tabs = IndexMap::with_capacity(settings.len());
        for s in settings {
            if tabs.insert(s.name(), *s).is_some() {
                return Err(FrontendError::InternalBug(format!(
                    "duplicate tab {:?} in registry",
                    s.name()
                )));
            }
        }
        Ok(Self { tabs })
    }

    pub fn get(&self, name: &str) -> Option<&TabSettings<T>> {
        self.tabs.get(name)
    }

    /// All tabs in display order
    pub fn settings(&self) -> Vec<TabSettings<T>> {
        self.tabs.values().copied().collect()
    }

    /// Look up `name`, substituting `default` when it is not registered
    pub fn lookup_or(&self, name: &str, default: T) -> Result<TabSettings<T>, FrontendError> {
        if let Some(settings) = self.get(name) {
            return Ok(*settings);
        }
        self.get(default.name()).copied().ok_or_else(|| {
            FrontendError::InternalBug(format!(
                "default tab {:?} is not registered",
                default.name()
            ))
        })
    }
}

/// The registries of both namespaces, built once at startup
#[derive(Debug, Clone)]
pub struct TabRegistries {
    pub package: TabRegistry<PackageTab>,
    pub module: TabRegistry<ModuleTab>,
}

impl TabRegistries {
    pub fn new() -> Result<Self, FrontendError> {
        Ok(Self {
            package: TabRegistry::new(PACKAGE_TAB_SETTINGS)?,
            module: TabRegistry::new(MODULE_TAB_SETTINGS)?,
        })
    }

    /// Unknown package tabs fall back to "doc" for redistributable packages,
    /// "module" otherwise.
    pub fn package_tab(
        &self,
        name: &str,
        is_redistributable: bool,
    ) -> Result<TabSettings<PackageTab>, FrontendError> {
        let default = if is_redistributable {
            PackageTab::Doc
        } else {
            PackageTab::Module
        };
        self.package.lookup_or(name, default)
    }

    /// Unknown module tabs fall back to "readme".
    pub fn module_tab(&self, name: &str) -> Result<TabSettings<ModuleTab>, FrontendError> {
        self.module.lookup_or(name, ModuleTab::Readme)
    }
}

/// Whether a tab's details may be fetched and shown
pub fn can_show_details<T: Tab>(is_redistributable: bool, settings: &TabSettings<T>) -> bool {
    is_redistributable || settings.always_show_details
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registries() -> TabRegistries {
        TabRegistries::new().unwrap()
    }

    #[rstest]
    #[case("doc", true, PackageTab::Doc)]
    #[case("licenses", false, PackageTab::Licenses)]
    #[case("importedby", false, PackageTab::ImportedBy)]
    #[case("", true, PackageTab::Doc)]
    #[case("", false, PackageTab::Module)]
    #[case("bogus", true, PackageTab::Doc)]
    #[case("bogus", false, PackageTab::Module)]
    #[case("DOC", true, PackageTab::Doc)]
    fn package_tab_returns_expected(
        #[case] name: &str,
        #[case] is_redistributable: bool,
        #[case] expected: PackageTab,
    ) {
        let settings = registries().package_tab(name, is_redistributable).unwrap();
        assert_eq!(settings.tab, expected);
    }

    #[rstest]
    #[case("packages", ModuleTab::Packages)]
    #[case("versions", ModuleTab::Versions)]
    #[case("", ModuleTab::Readme)]
    #[case("bogus", ModuleTab::Readme)]
    #[case("modfile", ModuleTab::Readme)]
    #[case("dependencies", ModuleTab::Readme)]
    fn module_tab_returns_expected(#[case] name: &str, #[case] expected: ModuleTab) {
        let settings = registries().module_tab(name).unwrap();
        assert_eq!(settings.tab, expected);
    }

    #[test]
    fn registry_keys_match_tab_names() {
        let registries = registries();
        for settings in PACKAGE_TAB_SETTINGS {
            assert_eq!(registries.package.get(settings.name()), Some(settings));
        }
        for settings in MODULE_TAB_SETTINGS {
            assert_eq!(registries.module.get(settings.name()), Some(settings));
        }
    }

    #[test]
    fn settings_preserve_declaration_order() {
        let names: Vec<_> = registries()
            .package
            .settings()
            .iter()
            .map(|s| s.name())
            .collect();

        assert_eq!(
            names,
            vec!["doc", "readme", "module", "versions", "imports", "importedby", "licenses"]
        );
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let settings = [MODULE_TAB_SETTINGS[0], MODULE_TAB_SETTINGS[0]];
        assert!(matches!(
            TabRegistry::new(&settings),
            Err(FrontendError::InternalBug(_))
        ));
    }

    #[test]
    fn lookup_or_reports_missing_default_as_bug() {
        let registry = TabRegistry::new(&MODULE_TAB_SETTINGS[1..]).unwrap();
        assert!(matches!(
            registry.lookup_or("bogus", ModuleTab::Readme),
            Err(FrontendError::InternalBug(_))
        ));
    }

    #[rstest]
    fn can_show_details_honours_always_show_flag(#[values(true, false)] is_redistributable: bool) {
        for settings in PACKAGE_TAB_SETTINGS {
            let expected = settings.always_show_details || is_redistributable;
            assert_eq!(can_show_details(is_redistributable, settings), expected);
        }
        for settings in MODULE_TAB_SETTINGS {
            let expected = settings.always_show_details || is_redistributable;
            assert_eq!(can_show_details(is_redistributable, settings), expected);
        }
    }

    #[test]
    fn gated_tabs_are_documentation_readme_and_licenses() {
        let gated: Vec<_> = PACKAGE_TAB_SETTINGS
            .iter()
            .filter(|s| !s.always_show_details)
            .map(|s| s.tab)
            .collect();

        assert_eq!(
            gated,
            vec![PackageTab::Doc, PackageTab::Readme, PackageTab::Licenses]
        );
    }
}
