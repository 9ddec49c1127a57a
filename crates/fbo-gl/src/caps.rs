//! Platform and driver capability detection.
//!
//! Detection runs once when a [`GlContext`](crate::GlContext) is created. The
//! result picks the framebuffer entry-point flavor and records the driver
//! quirks the pool has to work around.

/// The platform family a context was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Desktop OpenGL (Windows, Linux, macOS).
    Desktop,
    /// A generic OpenGL ES context.
    Gles,
    /// OpenGL ES on iOS.
    Ios,
    /// Broadcom OpenGL ES on the Raspberry Pi.
    RaspberryPi,
    /// OpenGL ES on Android, with either the fixed or programmable pipeline.
    Android { programmable: bool },
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        #[cfg(target_os = "android")]
        return Platform::Android { programmable: true };

        #[cfg(target_os = "ios")]
        return Platform::Ios;

        #[cfg(not(any(target_os = "android", target_os = "ios")))]
        Platform::Desktop
    }

    pub fn is_gles(self) -> bool {
        !matches!(self, Platform::Desktop)
    }
}

/// Which framebuffer entry points to call and which driver quirks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlFlavor {
    /// `glBindFramebufferEXT` and friends.
    DesktopExt,
    /// Core `glBindFramebuffer` (desktop GL 3.0+).
    DesktopCore,
    /// `glBindFramebufferOES` and friends.
    Oes,
    /// Core names on a GLES 2 driver that lacks status checks (Raspberry Pi).
    GlesCore,
    /// OES names on Android's fixed pipeline.
    AndroidFixed,
    /// Core names on Android's programmable pipeline.
    AndroidProgrammable,
}

impl GlFlavor {
    /// Suffix appended to `glGenFramebuffers` etc. when resolving symbols.
    pub fn suffix(self) -> &'static str {
        match self {
            GlFlavor::DesktopExt => "EXT",
            GlFlavor::Oes | GlFlavor::AndroidFixed => "OES",
            GlFlavor::DesktopCore | GlFlavor::GlesCore | GlFlavor::AndroidProgrammable => "",
        }
    }

    /// Whether `glGetIntegerv(GL_FRAMEBUFFER_BINDING)` works. Some Android
    /// drivers do not implement it.
    pub fn can_query_binding(self) -> bool {
        !matches!(self, GlFlavor::AndroidFixed | GlFlavor::AndroidProgrammable)
    }

    /// Whether `glCheckFramebufferStatus` is implemented.
    pub fn can_check_status(self) -> bool {
        !matches!(
            self,
            GlFlavor::AndroidFixed | GlFlavor::AndroidProgrammable | GlFlavor::GlesCore
        )
    }
}

/// Parsed `GL_VERSION` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
}

impl GlVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse strings like `"4.6.0 NVIDIA 535.54"` or `"OpenGL ES 3.2 Mesa"`.
    ///
    /// Returns the version and whether it names an ES context.
    pub fn parse(version: &str) -> Option<(GlVersion, bool)> {
        let trimmed = version.trim();
        let (rest, is_gles) = match trimmed.strip_prefix("OpenGL ES") {
            Some(rest) => {
                // "OpenGL ES-CM 1.1" / "OpenGL ES-CL 1.1" profiles.
                let rest = rest
                    .strip_prefix("-CM")
                    .or_else(|| rest.strip_prefix("-CL"))
                    .unwrap_or(rest);
                (rest.trim_start(), true)
            }
            None => (trimmed, false),
        };

        let number = rest.split_whitespace().next()?;
        let mut parts = number.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts
            .next()
            .map(|m| {
                m.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
            })
            .and_then(|m| m.parse().ok())
            .unwrap_or(0);

        Some((GlVersion::new(major, minor), is_gles))
    }
}

/// What the current driver can do for render-to-texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlCapabilities {
    pub platform: Platform,
    pub flavor: GlFlavor,
    pub version: Option<GlVersion>,
    pub is_gles: bool,
    pub ext_framebuffer_object: bool,
    pub oes_framebuffer_object: bool,
}

impl GlCapabilities {
    /// Decide the flavor and capabilities from the driver's version string and
    /// extension list.
    pub fn detect<S: AsRef<str>>(
        platform: Platform,
        version: Option<&str>,
        extensions: &[S],
    ) -> Self {
        let parsed = version.and_then(GlVersion::parse);
        let is_gles = platform.is_gles() || parsed.is_some_and(|(_, es)| es);
        let version = parsed.map(|(v, _)| v);

        let has = |name: &str| extensions.iter().any(|e| e.as_ref() == name);
        let ext_framebuffer_object = has("GL_EXT_framebuffer_object");
        let oes_framebuffer_object = has("GL_OES_framebuffer_object");

        let flavor = match platform {
            Platform::Android { programmable: true } => GlFlavor::AndroidProgrammable,
            Platform::Android { programmable: false } => GlFlavor::AndroidFixed,
            Platform::RaspberryPi => GlFlavor::GlesCore,
            Platform::Gles | Platform::Ios => GlFlavor::Oes,
            Platform::Desktop if is_gles => GlFlavor::Oes,
            Platform::Desktop => {
                if version.is_some_and(|v| v >= GlVersion::new(3, 0)) {
                    GlFlavor::DesktopCore
                } else {
                    GlFlavor::DesktopExt
                }
            }
        };

        Self {
            platform,
            flavor,
            version,
            is_gles,
            ext_framebuffer_object,
            oes_framebuffer_object,
        }
    }

    /// Whether the binder should try hardware render targets at all.
    ///
    /// Every ES driver the pool runs on supports FBOs even when the extension
    /// string does not say so.
    pub fn supports_render_to_texture(&self) -> bool {
        self.is_gles
            || self.ext_framebuffer_object
            || self.oes_framebuffer_object
            || self.flavor == GlFlavor::DesktopCore
    }

    pub fn can_query_binding(&self) -> bool {
        self.flavor.can_query_binding()
    }

    pub fn can_check_status(&self) -> bool {
        self.flavor.can_check_status()
    }
}
