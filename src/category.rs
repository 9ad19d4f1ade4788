//! Topic categories and the static table of representative packages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Topic bucket with a hand-curated list of representative packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Web,
    Data,
    Ml,
    Scraping,
    Cli,
    Gui,
    Test,
    Async,
}

impl Category {
    /// Every category, in table order
    pub const ALL: [Category; 8] = [
        Category::Web,
        Category::Data,
        Category::Ml,
        Category::Scraping,
        Category::Cli,
        Category::Gui,
        Category::Test,
        Category::Async,
    ];

    /// Categories the classifier tries, in precedence order
    pub const CLASSIFIABLE: [Category; 3] = [Category::Web, Category::Data, Category::Ml];

    /// Short tag, also used for substring classification
    pub fn tag(self) -> &'static str {
        match self {
            Category::Web => "web",
            Category::Data => "data",
            Category::Ml => "ml",
            Category::Scraping => "scraping",
            Category::Cli => "cli",
            Category::Gui => "gui",
            Category::Test => "test",
            Category::Async => "async",
        }
    }

    /// Representative packages in fixed order
    pub fn packages(self) -> &'static [&'static str] {
        match self {
            Category::Web => &["flask", "django", "fastapi", "bottle", "pyramid"],
            Category::Data => &["pandas", "numpy", "matplotlib", "seaborn", "scipy"],
            Category::Ml => &["scikit-learn", "tensorflow", "keras", "pytorch", "xgboost"],
            Category::Scraping => &["beautifulsoup4", "scrapy", "selenium", "requests-html", "lxml"],
            Category::Cli => &["click", "typer", "argparse", "docopt", "fire"],
            Category::Gui => &["pyqt5", "tkinter", "kivy", "pyside2", "wxpython"],
            Category::Test => &["pytest", "unittest", "nose", "coverage", "tox"],
            Category::Async => &["asyncio", "aiohttp", "trio", "twisted", "tornado"],
        }
    }

    fn matches(self, name: &str) -> bool {
        self.packages().contains(&name) || name.contains(self.tag())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.tag() == lowered)
            .ok_or_else(|| {
                let tags: Vec<_> = Category::ALL.iter().map(|c| c.tag()).collect();
                format!("Unknown category '{}'. Expected one of: {}", s, tags.join(", "))
            })
    }
}

/// Classify a package name.
///
/// Only web, data and ml are tried, in that order, by exact membership or by
/// the tag appearing in the name. Names matching none of them are
/// unclassified even if they belong to another category's list.
pub fn classify(name: &str) -> Option<Category> {
    Category::CLASSIFIABLE.into_iter().find(|c| c.matches(name))
}

/// Every package in the table, category by category
pub fn all_packages() -> impl Iterator<Item = &'static str> {
    Category::ALL.into_iter().flat_map(|c| c.packages().iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_membership() {
        assert_eq!(classify("django"), Some(Category::Web));
        assert_eq!(classify("numpy"), Some(Category::Data));
        assert_eq!(classify("keras"), Some(Category::Ml));
    }

    #[test]
    fn test_classify_by_substring() {
        assert_eq!(classify("webtest-helpers"), Some(Category::Web));
        assert_eq!(classify("dataclasses-json"), Some(Category::Data));
        assert_eq!(classify("mlflow"), Some(Category::Ml));
    }

    #[test]
    fn test_precedence_web_before_data() {
        // Contains both "web" and "data"
        assert_eq!(classify("webdata"), Some(Category::Web));
        // "html" contains "ml"
        assert_eq!(classify("requests-html"), Some(Category::Ml));
    }

    #[test]
    fn test_other_categories_are_unclassified() {
        assert_eq!(classify("pytest"), None);
        assert_eq!(classify("aiohttp"), None);
        assert_eq!(classify("click"), None);
        assert_eq!(classify("randomthing123"), None);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("Django"), None);
        assert_eq!(classify("WebOb"), None);
    }

    #[test]
    fn test_table_shape() {
        for category in Category::ALL {
            assert_eq!(category.packages().len(), 5, "{}", category);
        }
        assert_eq!(all_packages().count(), 40);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ASYNC".parse::<Category>(), Ok(Category::Async));
        assert!("nope".parse::<Category>().is_err());
    }
}
