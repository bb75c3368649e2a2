//! Opt-in relaxed dialects.
//!
//! Strict KDL is the default. Each flag loosens the grammar in one specific
//! way; flags combine freely.
//!
//! ```rust
//! use kdl_relaxed::{parse_with_options, ParseOptions, Relaxed};
//!
//! let options = ParseOptions::new().with_relaxed(Relaxed::NGINX_SYNTAX);
//! let doc = parse_with_options(b"location / {\n\troot /var/www;\n}", &options).unwrap();
//! assert_eq!(doc.nodes()[0].arguments()[0].as_str(), Some("/"));
//! ```

bitflags::bitflags! {
    /// Relaxed grammar extensions, selected at parse time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Relaxed: u8 {
        /// nginx-style configuration syntax: `#` comments, single-quoted
        /// strings, `( ) / \ "` inside bare identifiers, and numerals with
        /// trailing letters read as bare identifiers.
        const NGINX_SYNTAX = 0b0000_0001;
        /// `=` or `:` between a node name and its first argument.
        const YAML_TOML_ASSIGNMENTS = 0b0000_0010;
        /// Numerals with magnitude or duration suffixes (`32k`, `10mb`, `1h30m`).
        const MULTIPLIER_SUFFIXES = 0b0000_0100;
    }
}

impl Relaxed {
    /// Strict grammar with no extensions.
    pub const STRICT: Relaxed = Relaxed::empty();

    /// Returns `true` if `flag` is enabled.
    #[inline]
    #[must_use]
    pub const fn permit(self, flag: Relaxed) -> bool {
        self.intersects(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permit() {
        let flags = Relaxed::NGINX_SYNTAX | Relaxed::MULTIPLIER_SUFFIXES;
        assert!(flags.permit(Relaxed::NGINX_SYNTAX));
        assert!(flags.permit(Relaxed::MULTIPLIER_SUFFIXES));
        assert!(!flags.permit(Relaxed::YAML_TOML_ASSIGNMENTS));
        assert!(!Relaxed::default().permit(Relaxed::NGINX_SYNTAX));
        assert_eq!(Relaxed::STRICT, Relaxed::default());
    }
}
