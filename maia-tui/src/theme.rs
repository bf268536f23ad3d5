//! CRT-style themes for MAIA

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    pub bg: Color,
    /// Selected items, active elements
    pub highlight: Color,
    /// Meters, played waveform, sync glow
    pub accent: Color,
    pub warning: Color,
    pub danger: Color,
    /// Original track color
    pub original: Color,
    /// Adversarial track color
    pub adversarial: Color,
    /// Inpainting region markers
    pub region: Color,
}

impl Theme {
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn border_active(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Border glow while a synchronized session is running
    pub fn sync_glow(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn original_style(&self) -> Style {
        Style::default().fg(self.original)
    }

    pub fn adversarial_style(&self) -> Style {
        Style::default().fg(self.adversarial)
    }

    pub fn region_style(&self) -> Style {
        Style::default().fg(self.region)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.danger)
    }

    /// Get style for meters/bars based on level (0.0 - 1.0)
    pub fn meter_style(&self, level: f32) -> Style {
        let color = if level > 0.9 {
            self.danger
        } else if level > 0.75 {
            self.warning
        } else {
            self.accent
        };
        Style::default().fg(color)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for waveform based on playhead position
    pub fn waveform_style(&self, is_future: bool) -> Style {
        if is_future {
            Style::default().fg(self.fg_dim)
        } else {
            Style::default().fg(self.accent)
        }
    }
}

/// Classic phosphor green CRT theme
pub const CRT_GREEN: Theme = Theme {
    name: "phosphor-green",
    fg: Color::Rgb(51, 255, 51),          // #33ff33 - phosphor green
    fg_dim: Color::Rgb(25, 128, 25),      // dimmed green
    bg: Color::Rgb(0, 10, 0),             // near black with green tint
    highlight: Color::Rgb(180, 255, 180), // bright green
    accent: Color::Rgb(100, 255, 100),    // medium green
    warning: Color::Rgb(255, 255, 100),   // yellow-green
    danger: Color::Rgb(255, 100, 100),    // red warning
    original: Color::Rgb(100, 255, 150),  // green-cyan
    adversarial: Color::Rgb(255, 120, 90), // hot coral, stands out on green
    region: Color::Rgb(255, 255, 100),
};

/// Amber CRT theme (1980s monochrome)
pub const CRT_AMBER: Theme = Theme {
    name: "amber",
    fg: Color::Rgb(255, 176, 0),          // #ffb000 - amber
    fg_dim: Color::Rgb(128, 88, 0),       // dimmed amber
    bg: Color::Rgb(10, 5, 0),             // near black with amber tint
    highlight: Color::Rgb(255, 220, 128), // bright amber
    accent: Color::Rgb(255, 200, 64),     // medium amber
    warning: Color::Rgb(255, 255, 100),   // yellow
    danger: Color::Rgb(255, 100, 100),    // red warning
    original: Color::Rgb(255, 180, 50),   // orange-amber
    adversarial: Color::Rgb(255, 110, 60),
    region: Color::Rgb(255, 255, 160),
};

/// Cyberpunk neon theme
pub const CYBERPUNK: Theme = Theme {
    name: "cyberpunk",
    fg: Color::Rgb(0, 255, 255),          // cyan
    fg_dim: Color::Rgb(0, 128, 128),      // dim cyan
    bg: Color::Rgb(5, 0, 10),             // dark purple-black
    highlight: Color::Rgb(255, 0, 255),   // magenta
    accent: Color::Rgb(0, 255, 128),      // neon green
    warning: Color::Rgb(255, 255, 0),     // yellow
    danger: Color::Rgb(255, 50, 50),      // red
    original: Color::Rgb(100, 255, 255),  // light cyan
    adversarial: Color::Rgb(255, 100, 255), // pink
    region: Color::Rgb(255, 255, 0),
};

impl Theme {
    /// Look up a preset by name or alias
    pub fn by_name(name: &str) -> Option<Theme> {
        match name.to_lowercase().as_str() {
            "green" | "phosphor" | "phosphor-green" => Some(CRT_GREEN),
            "amber" | "orange" => Some(CRT_AMBER),
            "cyber" | "cyberpunk" | "neon" => Some(CYBERPUNK),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        CRT_GREEN
    }
}
