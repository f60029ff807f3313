//! Domain constants
//!
//! Separators and markers used when rendering keys, paths and locations.

/// Arrow joining the keys of a dependency cycle
pub const CYCLE_ARROW: &str = " → ";

/// Separator between a type name and its scope qualifier (`Handler@a`)
pub const SCOPE_QUALIFIER_SEPARATOR: &str = "@";

/// Prefix of a scope-keyed map request (`map[scope]Handler`)
pub const BY_SCOPE_PREFIX: &str = "map[scope]";

/// Path separator stripped from fully qualified type names
pub const PATH_SEPARATOR: &str = "::";
