/// Response to a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Out of memory; the runtime exits.
    Fatal,
}

pub(super) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(super) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// What the caller should do after `err`; `Lost`/`Outdated` need a reconfigure.
pub(super) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: &[wgpu::TextureFormat]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    #[test]
    fn srgb_is_preferred_when_present() {
        let c = caps(&[wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb]);
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn no_formats_yields_none() {
        assert_eq!(choose_surface_format(&caps(&[]), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(&[wgpu::TextureFormat::Bgra8Unorm]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn surface_errors_map_to_actions() {
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
