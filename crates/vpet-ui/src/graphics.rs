use std::io::IsTerminal;

/// How scene pixels are mapped onto terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsBackend {
    /// Two vertically stacked pixels per cell using `▀`/`▄` (works almost
    /// everywhere with a truecolor terminal).
    HalfBlock,
    /// One pixel per cell drawn as a colored space, for fonts that render
    /// the half-block glyphs badly.
    FullBlock,
}

impl GraphicsBackend {
    /// Scene pixel rows covered by one terminal row.
    pub fn rows_per_cell(self) -> u16 {
        match self {
            GraphicsBackend::HalfBlock => 2,
            GraphicsBackend::FullBlock => 1,
        }
    }
}

/// Everything about the output device the app decides once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Both stdin and stdout are terminals, so the TUI can run. Otherwise
    /// the app runs headless.
    pub interactive: bool,
    pub backend: GraphicsBackend,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal() && std::io::stdin().is_terminal(),
            backend: detect_backend(),
        }
    }
}

/// Pick the cell mapping.
///
/// `VPET_GRAPHICS=half|full` wins; otherwise `TERM=dumb` or `TERM=linux`
/// get [`GraphicsBackend::FullBlock`] and everything else half blocks.
pub fn detect_backend() -> GraphicsBackend {
    if let Ok(val) = std::env::var("VPET_GRAPHICS") {
        match val.to_lowercase().as_str() {
            "half" | "unicode" => return GraphicsBackend::HalfBlock,
            "full" | "block" => return GraphicsBackend::FullBlock,
            other => tracing::warn!(value = other, "unknown VPET_GRAPHICS value ignored"),
        }
    }

    match std::env::var("TERM").as_deref() {
        Ok("dumb") | Ok("linux") => GraphicsBackend::FullBlock,
        _ => GraphicsBackend::HalfBlock,
    }
}
