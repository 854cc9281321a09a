use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use tracing::warn;

const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used across the UI, resolved from a Catppuccin flavour.
///
/// Widgets use the semantic accessors (`primary()`, `error()`, ...) rather
/// than the palette names, so the mapping lives in one place.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub surface0: Color,
    pub surface1: Color,
    pub overlay0: Color,
    pub text: Color,
    pub subtext0: Color,

    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub sky: Color,
    pub blue: Color,
    pub lavender: Color,

    pub border_type: BorderType,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            overlay0: catppuccin_to_color(&c.overlay0),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            sky: catppuccin_to_color(&c.sky),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    // === Palette ===

    pub const fn base(&self) -> Color {
        self.base
    }

    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    pub const fn text(&self) -> Color {
        self.text
    }

    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    pub const fn lavender(&self) -> Color {
        self.lavender
    }

    // === Semantic colors ===

    pub const fn primary(&self) -> Color {
        self.mauve
    }

    pub const fn secondary(&self) -> Color {
        self.blue
    }

    pub const fn success(&self) -> Color {
        self.green
    }

    pub const fn warning(&self) -> Color {
        self.yellow
    }

    pub const fn error(&self) -> Color {
        self.red
    }

    pub const fn info(&self) -> Color {
        self.sky
    }

    pub const fn border(&self) -> Color {
        self.surface1
    }

    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    pub const fn selection_bg(&self) -> Color {
        self.surface0
    }

    pub const fn header(&self) -> Color {
        self.subtext0
    }

    pub const fn highlight(&self) -> Color {
        self.peach
    }

    pub const fn muted(&self) -> Color {
        self.overlay0
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

const THEMES: [(&str, fn() -> Theme); 4] = [
    ("Catppuccin Mocha", Theme::catppuccin_mocha),
    ("Catppuccin Macchiato", Theme::catppuccin_macchiato),
    ("Catppuccin Frappe", Theme::catppuccin_frappe),
    ("Catppuccin Latte", Theme::catppuccin_latte),
];

/// Look up a theme by its config name, case-insensitively.
///
/// Unknown names fall back to the default theme.
pub fn theme_from_name(name: &str) -> Theme {
    THEMES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name.trim()))
        .map_or_else(
            || {
                warn!("Unknown theme {:?}, using default", name);
                Theme::default()
            },
            |(_, theme)| theme(),
        )
}
