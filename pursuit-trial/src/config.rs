use pursuit_core::OverlayStyle;
use serde::{Deserialize, Serialize};

/// Host-supplied trial parameters.
///
/// `sources`, `width` and `height` are required; everything else defaults.
/// `start` and `stop` are playback offsets in seconds of media time; an
/// unset `stop` means the trial ends only with the stimulus's natural end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialParams {
    pub sources: Vec<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
    #[serde(default)]
    pub controls: bool,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub stop: Option<f64>,
    #[serde(default)]
    pub overlay: OverlayStyle,
}

fn default_autoplay() -> bool {
    true
}

impl TrialParams {
    pub fn new(sources: Vec<String>, width: u32, height: u32) -> Self {
        Self {
            sources,
            width,
            height,
            autoplay: true,
            controls: false,
            prompt: None,
            start: None,
            stop: None,
            overlay: OverlayStyle::default(),
        }
    }

    /// The playback position the stop offset is measured from; a missing
    /// start offset counts as zero.
    pub fn effective_start(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_params_deserialize_with_defaults() {
        let params: TrialParams = serde_json::from_str(
            r#"{"sources": ["pursuit.mp4"], "width": 640, "height": 480}"#,
        )
        .unwrap();
        assert!(params.autoplay);
        assert!(!params.controls);
        assert_eq!(params.prompt, None);
        assert_eq!(params.start, None);
        assert_eq!(params.stop, None);
        assert_eq!(params.effective_start(), 0.0);
        assert_eq!(params.overlay, OverlayStyle::default());
    }

    #[test]
    fn offsets_round_trip() {
        let mut params = TrialParams::new(vec!["a.webm".into()], 800, 600);
        params.start = Some(1.5);
        params.stop = Some(4.0);
        let json = serde_json::to_string(&params).unwrap();
        let back: TrialParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start, Some(1.5));
        assert_eq!(back.stop, Some(4.0));
        assert_eq!(back.effective_start(), 1.5);
    }
}
