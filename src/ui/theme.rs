use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for CLI status lines; the report body itself is never styled
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            header: pick(Style::new().cyan().bold()),
            success: pick(Style::new().green().bold()),
            error: pick(Style::new().red().bold()),
            warn: pick(Style::new().yellow().bold()),
            info: pick(Style::new().blue()),
            dim: pick(Style::new().dimmed()),
        }
    }

    /// Colored only on a terminal that `NO_COLOR`/`CLICOLOR` leave enabled
    pub fn detect() -> Self {
        Self::new(console::Term::stdout().is_term() && console::colors_enabled())
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
