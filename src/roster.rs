//! Class list ordering
//!
//! Class names come in two flavors: academic grade-pattern names like
//! `10A` or `7Б` (one or two digits followed by a single uppercase Latin
//! or Cyrillic letter) and free-form group names like `Staff`. Academic
//! classes sort first, by numeric grade then by letter; everything else
//! follows alphabetically.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use crate::api::types::ClassSummary;

/// Grade-pattern matcher: 1-2 digits and a single uppercase class letter.
fn grade_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2})([A-ZА-Я])$").expect("valid class pattern"))
}

/// Parse a grade-pattern name into its (grade, letter) sort key.
fn grade_key(name: &str) -> Option<(u8, char)> {
    let captures = grade_pattern().captures(name)?;
    let grade: u8 = captures[1].parse().ok()?;
    let letter = captures[2].chars().next()?;
    Some((grade, letter))
}

/// Sort classes in place: grade-pattern names first (grade, then letter),
/// then all remaining names alphabetically.
///
/// # Examples
///
/// ```
/// use ciseval::api::types::ClassSummary;
/// use ciseval::roster::sort_classes;
///
/// let mut classes: Vec<ClassSummary> = ["10A", "7B", "Staff", "9C"]
///     .iter()
///     .map(|name| ClassSummary { id: name.to_string(), name: name.to_string() })
///     .collect();
/// sort_classes(&mut classes);
/// let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
/// assert_eq!(names, ["7B", "9C", "10A", "Staff"]);
/// ```
pub fn sort_classes(classes: &mut [ClassSummary]) {
    classes.sort_by(|a, b| compare_names(&a.name, &b.name));
}

fn compare_names(a: &str, b: &str) -> Ordering {
    match (grade_key(a), grade_key(b)) {
        (Some(ka), Some(kb)) => ka.cmp(&kb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
