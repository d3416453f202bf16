//! Logical output styles
//!
//! Each role maps onto an optional `colored::Color`. Painting only happens when
//! the caller passes `enabled = true`.
//!
//! ```
//! use modhost::core::styles::StyleRole;
//! colored::control::set_override(true);
//! assert_eq!(StyleRole::Header.paint("Modules", false), "Modules");
//! assert!(StyleRole::Header.paint("Modules", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::{Color, Colorize};

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header  => Some(Color::Yellow),
    Literal => Some(Color::Cyan),
    Valid   => Some(Color::Green),
    Invalid => Some(Color::Red),
    Warning => Some(Color::BrightYellow),
    Dim     => Some(Color::BrightBlack),
    Value   => None,
}

impl StyleRole {
    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.color() {
            Some(color) if enabled => text.color(color).to_string(),
            _ => text.to_string(),
        }
    }

    /// prettytable `style_spec` for this role (`Fg`, `Fr` ...)
    pub fn to_prettytable_spec(self) -> Option<&'static str> {
        Some(match self.color()? {
            Color::Red => "Fr",
            Color::Green => "Fg",
            Color::Yellow => "Fy",
            Color::Cyan => "Fc",
            Color::BrightYellow => "FY",
            Color::BrightBlack => "FK",
            _ => return None,
        })
    }

    fn ansi(self) -> Option<AnsiColor> {
        Some(match self.color()? {
            Color::Red => AnsiColor::Red,
            Color::Green => AnsiColor::Green,
            Color::Yellow => AnsiColor::Yellow,
            Color::Cyan => AnsiColor::Cyan,
            Color::BrightYellow => AnsiColor::BrightYellow,
            Color::BrightBlack => AnsiColor::BrightBlack,
            _ => return None,
        })
    }
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new().fg_color(role.ansi().map(ClapColor::Ansi));
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .valid(style(StyleRole::Valid, false))
        .invalid(style(StyleRole::Invalid, false))
        .error(style(StyleRole::Invalid, true))
}
