//! Categories and the table that accumulates them.
//!
//! A `Category` is an opaque, ordered set of symbols. Rules never look inside
//! a symbol: a category only knows its elements, the position of each element
//! (used to enforce agreement between numbered references), and a derived
//! regex alternation used when a rule fragment mentions it.
//!
//! ## Match form
//!
//! Elements are escaped and sorted by descending length before being joined,
//! so that when two symbols share a prefix the longer one is tried first:
//!
//! ```text
//! K = k kʷ x      ->  kʷ|k|x
//! ```
//!
//! The sort is stable, so elements of equal length keep their declared order.
//!
//! ## Invariants
//!
//! - A category never holds the same element twice.
//! - A `CategoryTable` never holds the same name twice, and only ever grows.
//!   Compiled rules keep `Arc` handles to the categories they reference, so
//!   later definitions never change the meaning of an earlier rule.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::syntax::{self, is_category_name};
use crate::error::{Error, Result};

/// Pattern used for a category with no elements: a class that matches nothing.
const NEVER_MATCHES: &str = r"[^\s\S]";

/// A named, ordered, duplicate-free set of symbols.
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    elements: Vec<String>,
    index_of: HashMap<String, usize>,
    pattern: String,
}

impl Category {
    /// Build a category.
    ///
    /// The result always survives a trip through its textual form: the name
    /// must be a valid category name, and elements must be non-empty, free of
    /// whitespace and distinct.
    pub fn new<S: Into<String>>(name: impl Into<String>, elements: impl IntoIterator<Item = S>) -> Result<Self> {
        let name = name.into();
        if !is_category_name(&name) {
            return Err(Error::MalformedCategoryName { name });
        }
        let elements: Vec<String> = elements.into_iter().map(Into::into).collect();

        let mut index_of = HashMap::with_capacity(elements.len());
        for (idx, element) in elements.iter().enumerate() {
            if element.is_empty() || element.chars().any(char::is_whitespace) {
                return Err(Error::MalformedCategoryElement { category: name, element: element.clone() });
            }
            if index_of.insert(element.clone(), idx).is_some() {
                return Err(Error::DuplicateCategoryElement { category: name, element: element.clone() });
            }
        }

        let pattern = match_form(&elements);
        Ok(Category { name, elements, index_of, pattern })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Elements in declaration order.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    /// Position of `element` in declaration order.
    pub fn index_of(&self, element: &str) -> Option<usize> {
        self.index_of.get(element).copied()
    }

    /// Regex alternation matching any element, longest first.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.elements == other.elements
    }
}

impl Eq for Category {}

/// Writes the category the way it appears in a rule file: `C = p t k`.
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.elements.join(" "))
    }
}

fn match_form(elements: &[String]) -> String {
    if elements.is_empty() {
        return NEVER_MATCHES.to_string();
    }
    let mut sorted: Vec<&String> = elements.iter().collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    sorted.iter().map(|e| regex::escape(e)).collect::<Vec<_>>().join("|")
}

/// Insertion-ordered mapping from category name to category.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: IndexMap<String, Arc<Category>>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Category>> {
        self.categories.get(name)
    }

    /// Like [`get`](Self::get), but a missing name is an `UndefinedCategory` error.
    pub fn lookup(&self, name: &str) -> Result<&Arc<Category>> {
        self.categories.get(name).ok_or_else(|| Error::UndefinedCategory { name: name.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Add a category. Names may only be defined once per table.
    pub fn insert(&mut self, category: Category) -> Result<Arc<Category>> {
        if let Some(existing) = self.categories.get(category.name()) {
            return Err(Error::DuplicateCategoryDefinition {
                name: category.name().to_string(),
                existing: existing.to_string(),
            });
        }
        let category = Arc::new(category);
        self.categories.insert(category.name().to_string(), Arc::clone(&category));
        Ok(category)
    }

    /// Parse a definition line such as `C = {P} {N} h` against this table.
    ///
    /// Every `{Name}` on the right-hand side must already be defined; it is
    /// replaced by that category's elements before the line is split on
    /// whitespace. The new category is returned, not inserted.
    pub fn parse_definition(&self, line: &str) -> Result<Category> {
        let line = line.trim();
        let Some((name, values)) = syntax::split_definition(line) else {
            return Err(Error::MalformedLine { line: line.to_string() });
        };
        let name = name.trim();
        if !is_category_name(name) {
            return Err(Error::MalformedLine { line: line.to_string() });
        }
        if let Some(existing) = self.categories.get(name) {
            return Err(Error::DuplicateCategoryDefinition { name: name.to_string(), existing: existing.to_string() });
        }

        let mut expanded = String::with_capacity(values.len());
        let mut last = 0;
        for token in syntax::category_tokens(values)? {
            if token.number.is_some() {
                return Err(Error::MalformedReference { token: values[token.span.clone()].to_string() });
            }
            let category = self.lookup(token.name)?;
            expanded.push_str(&values[last..token.span.start]);
            expanded.push(' ');
            expanded.push_str(&category.elements().join(" "));
            expanded.push(' ');
            last = token.span.end;
        }
        expanded.push_str(&values[last..]);

        Category::new(name, expanded.split_whitespace())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Category>> {
        self.categories.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_p() -> CategoryTable {
        let mut table = CategoryTable::new();
        table.insert(Category::new("P", ["p", "b", "f", "v", "m"]).unwrap()).unwrap();
        table
    }

    #[test]
    fn duplicate_elements_are_rejected() {
        let err = Category::new("K", ["ŋ", "k", "g", "x", "ɣ", "ŋ"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateCategoryElement { ref category, ref element }
            if category == "K" && element == "ŋ"));
    }

    #[test]
    fn constructor_rejects_what_cannot_be_written_back() {
        // Array of (name, elements, predicate on the error)
        let cases: Vec<(&str, Vec<&str>, fn(&Error) -> bool)> = vec![
            ("X", vec!["", "a"], |e: &Error| matches!(e, Error::MalformedCategoryElement { element, .. } if element.is_empty())),
            ("X", vec!["a b", "c"], |e: &Error| matches!(e, Error::MalformedCategoryElement { element, .. } if element == "a b")),
            ("X", vec!["a\t"], |e: &Error| matches!(e, Error::MalformedCategoryElement { .. })),
            ("1X", vec!["a"], |e: &Error| matches!(e, Error::MalformedCategoryName { name } if name == "1X")),
            ("A B", vec!["a"], |e: &Error| matches!(e, Error::MalformedCategoryName { .. })),
            ("A:B", vec!["a"], |e: &Error| matches!(e, Error::MalformedCategoryName { .. })),
            ("", vec!["a"], |e: &Error| matches!(e, Error::MalformedCategoryName { .. })),
        ];

        for (name, elements, check) in cases {
            let err = Category::new(name, elements.clone()).unwrap_err();
            assert!(check(&err), "category `{name}` {elements:?}: unexpected {err:?}");
        }
    }

    #[test]
    fn match_form_prefers_longest_element() {
        let cat = Category::new("X", ["a", "ab"]).unwrap();
        assert_eq!(cat.pattern(), "ab|a");

        let cat = Category::new("K", ["k", "kʷ", "x", "g"]).unwrap();
        assert_eq!(cat.pattern(), "kʷ|k|x|g");
    }

    #[test]
    fn match_form_escapes_metacharacters() {
        let cat = Category::new("S", [".", "a+"]).unwrap();
        assert_eq!(cat.pattern(), r"a\+|\.");
    }

    #[test]
    fn empty_category_never_matches() {
        let cat = Category::new("E", Vec::<String>::new()).unwrap();
        let re = regex::Regex::new(cat.pattern()).unwrap();
        assert!(!re.is_match("anything at all"));
        assert!(!re.is_match(""));
    }

    #[test]
    fn index_lookup_follows_declaration_order() {
        let cat = Category::new("N", ["m", "n", "ŋ"]).unwrap();
        assert_eq!(cat.index_of("ŋ"), Some(2));
        assert_eq!(cat.get(1), Some("n"));
        assert_eq!(cat.get(3), None);
        assert_eq!(cat.index_of("p"), None);
    }

    #[test]
    fn parse_plain_definition() {
        let table = CategoryTable::new();
        let cat = table.parse_definition("C = p t k").unwrap();
        assert_eq!(cat, Category::new("C", ["p", "t", "k"]).unwrap());
    }

    #[test]
    fn parse_empty_definition() {
        let table = CategoryTable::new();
        for line in ["E = ", "E =", "  E =   "] {
            let cat = table.parse_definition(line).unwrap();
            assert!(cat.is_empty(), "line `{line}`");
            assert_eq!(cat.name(), "E");
        }
    }

    #[test]
    fn parse_definition_expands_earlier_categories() {
        let table = table_with_p();
        let cat = table.parse_definition("W = {P} q w").unwrap();
        assert_eq!(cat.elements(), ["p", "b", "f", "v", "m", "q", "w"]);
    }

    #[test]
    fn parse_definition_rejects_redefinition() {
        let table = table_with_p();
        let err = table.parse_definition("P = p b m w").unwrap_err();
        assert!(matches!(err, Error::DuplicateCategoryDefinition { ref name, .. } if name == "P"));
    }

    #[test]
    fn parse_definition_rejects_unknown_reference() {
        let table = table_with_p();
        let err = table.parse_definition("W = {Q} w").unwrap_err();
        assert!(matches!(err, Error::UndefinedCategory { ref name } if name == "Q"));
    }

    #[test]
    fn parse_definition_rejects_numbered_reference() {
        let table = table_with_p();
        let err = table.parse_definition("W = {0:P} w").unwrap_err();
        assert!(matches!(err, Error::MalformedReference { ref token } if token == "{0:P}"));
    }

    #[test]
    fn parse_definition_rejects_bad_names() {
        let table = CategoryTable::new();
        for line in ["1 = a b", "A B = a b", "A:B = a", " = a"] {
            assert!(
                matches!(table.parse_definition(line), Err(Error::MalformedLine { .. })),
                "expected `{line}` to be rejected"
            );
        }
    }

    #[test]
    fn insert_twice_fails() {
        let mut table = table_with_p();
        let err = table.insert(Category::new("P", ["p"]).unwrap()).unwrap_err();
        assert!(matches!(err, Error::DuplicateCategoryDefinition { ref existing, .. } if existing == "P = p b f v m"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn textual_form_round_trips() {
        let table = CategoryTable::new();
        for cat in [
            Category::new("Vu", ["a", "e", "i", "o", "u"]).unwrap(),
            Category::new("K", ["kʷ", "k", "ŋ"]).unwrap(),
            Category::new("E", Vec::<String>::new()).unwrap(),
        ] {
            let reparsed = table.parse_definition(&cat.to_string()).unwrap();
            assert_eq!(reparsed, cat);
        }
    }

    #[test]
    fn iteration_keeps_definition_order() {
        let mut table = table_with_p();
        table.insert(Category::new("A", ["a"]).unwrap()).unwrap();
        table.insert(Category::new("Z", ["z"]).unwrap()).unwrap();
        let names: Vec<&str> = table.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["P", "A", "Z"]);
    }
}
