//! Title de-duplication for template-based creation.
//!
//! Simulation titles are unique per author. When an existing simulation is
//! used as a template the suggested title gets a ` (n)` suffix, counting up
//! from 2 until it no longer collides.

/// Pick a title based on `desired` that does not collide with `existing`.
///
/// # Examples
///
/// ```
/// use apportal_core::naming::unique_title;
///
/// let taken = vec!["my title".to_string(), "my title (2)".to_string()];
/// assert_eq!(unique_title("my title", &taken), "my title (3)");
/// assert_eq!(unique_title("fresh", &taken), "fresh");
/// ```
pub fn unique_title(desired: &str, existing: &[String]) -> String {
    if !existing.iter().any(|t| t == desired) {
        return desired.to_string();
    }
    let mut n: u32 = 2;
    loop {
        let candidate = format!("{desired} ({n})");
        if !existing.iter().any(|t| *t == candidate) {
            return candidate;
        }
        n += 1;
    }
}
