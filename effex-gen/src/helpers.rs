//! Naming helpers for code generation
//!
//! Every output file name and generated identifier goes through these
//! functions so the transform stays identical across runs.

use inflector::Inflector;

/// Naming conventions used by the renderer and the emitter
pub struct NameHelpers;

impl NameHelpers {
    /// Convert string to `PascalCase`
    ///
    /// # Examples
    ///
    /// ```
    /// # use effex_gen::NameHelpers;
    /// assert_eq!(NameHelpers::to_pascal_case("user_profile"), "UserProfile");
    /// assert_eq!(NameHelpers::to_pascal_case("userProfile"), "UserProfile");
    /// ```
    #[must_use]
    pub fn to_pascal_case(input: &str) -> String {
        input.to_pascal_case()
    }

    /// Convert string to camelCase
    ///
    /// # Examples
    ///
    /// ```
    /// # use effex_gen::NameHelpers;
    /// assert_eq!(NameHelpers::to_camel_case("UserProfile"), "userProfile");
    /// ```
    #[must_use]
    pub fn to_camel_case(input: &str) -> String {
        input.to_camel_case()
    }

    /// Convert string to kebab-case
    ///
    /// # Examples
    ///
    /// ```
    /// # use effex_gen::NameHelpers;
    /// assert_eq!(NameHelpers::to_kebab_case("UserProfile"), "user-profile");
    /// assert_eq!(NameHelpers::to_kebab_case("HTTPRequest"), "http-request");
    /// ```
    #[must_use]
    pub fn to_kebab_case(input: &str) -> String {
        input.to_kebab_case()
    }

    /// Pluralize a word
    ///
    /// The inflector library has known limitations with some irregular plurals.
    /// Model names are typically regular words.
    #[must_use]
    pub fn pluralize(input: &str) -> String {
        input.to_plural()
    }

    /// Stem for service file names: the model name lowercased
    ///
    /// # Examples
    ///
    /// ```
    /// # use effex_gen::NameHelpers;
    /// assert_eq!(NameHelpers::to_service_stem("UserProfile"), "userprofile");
    /// ```
    #[must_use]
    pub fn to_service_stem(model: &str) -> String {
        model.to_lowercase()
    }

    /// Method suffix for the read-all operation (`getAllUsers`)
    #[must_use]
    pub fn to_collection_name(model: &str) -> String {
        Self::to_pascal_case(&Self::pluralize(model))
    }

    /// Client delegate property for a model: first character lowercased
    ///
    /// # Examples
    ///
    /// ```
    /// # use effex_gen::NameHelpers;
    /// assert_eq!(NameHelpers::to_delegate_name("UserProfile"), "userProfile");
    /// assert_eq!(NameHelpers::to_delegate_name("user_profile"), "user_profile");
    /// ```
    #[must_use]
    pub fn to_delegate_name(model: &str) -> String {
        let mut chars = model.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_lowercase().chain(chars).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(NameHelpers::to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(NameHelpers::to_pascal_case("user"), "User");
        assert_eq!(NameHelpers::to_pascal_case("Simple"), "Simple");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(NameHelpers::to_camel_case("user_profile"), "userProfile");
        assert_eq!(NameHelpers::to_camel_case("Post"), "post");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(NameHelpers::to_kebab_case("UserProfile"), "user-profile");
        assert_eq!(NameHelpers::to_kebab_case("simple"), "simple");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(NameHelpers::pluralize("post"), "posts");
        assert_eq!(NameHelpers::pluralize("category"), "categories");
        assert_eq!(NameHelpers::pluralize("user"), "users");
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(NameHelpers::to_collection_name("User"), "Users");
        assert_eq!(NameHelpers::to_collection_name("Category"), "Categories");
    }

    #[test]
    fn test_service_stem() {
        assert_eq!(NameHelpers::to_service_stem("User"), "user");
        assert_eq!(NameHelpers::to_service_stem("UserProfile"), "userprofile");
    }
}
