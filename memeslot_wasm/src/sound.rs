use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Spin,
    Win,
    Lose,
}

impl Sound {
    pub fn path(self) -> &'static str {
        match self {
            Sound::Spin => "/sounds/spin.mp3",
            Sound::Win => "/sounds/win.mp3",
            Sound::Lose => "/sounds/lose.mp3",
        }
    }

    /// Result jingle for a settled spin.
    pub fn for_payout(payout: f64) -> Self {
        if payout > 0.0 {
            Sound::Win
        } else {
            Sound::Lose
        }
    }
}

/// Preloaded clips. A clip that failed to load is skipped silently.
pub struct Sounds {
    spin: Option<HtmlAudioElement>,
    win: Option<HtmlAudioElement>,
    lose: Option<HtmlAudioElement>,
}

impl Sounds {
    pub fn load() -> Self {
        let clip = |s: Sound| HtmlAudioElement::new_with_src(s.path()).ok();
        Self {
            spin: clip(Sound::Spin),
            win: clip(Sound::Win),
            lose: clip(Sound::Lose),
        }
    }

    /// Restarts the clip from the beginning.
    pub fn play(&self, sound: Sound) {
        let audio = match sound {
            Sound::Spin => &self.spin,
            Sound::Win => &self.win,
            Sound::Lose => &self.lose,
        };
        let Some(audio) = audio else {
            return;
        };
        audio.set_current_time(0.0);
        // browsers reject playback before the first user gesture
        if let Ok(promise) = audio.play() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    web_sys::console::warn_1(&e);
                }
            });
        }
    }
}
