use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `LINEAGE_QUIET=1|true` suppresses decorative status lines
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| parse_quiet(std::env::var("LINEAGE_QUIET").ok().as_deref()))
}

fn parse_quiet(value: Option<&str>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
