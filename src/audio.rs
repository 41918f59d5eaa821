//! Audio system using Web Audio API
//!
//! Each effect is a single enveloped oscillator tone. No sound files.

use crate::services::SoundSink;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Coin, star or tap
    Collect,
    /// Power-up picked up
    PowerUp,
    /// Run-ending hit
    Collision,
    /// Level up or achievement
    LevelUp,
    /// Shield absorbed a hit
    Shield,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
}

/// Tone parameters for one effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Hz
    pub freq: f32,
    /// Seconds
    pub duration: f64,
    pub waveform: Waveform,
}

/// Attack time before the exponential release
pub const ATTACK_SECS: f64 = 0.01;

impl SoundEffect {
    pub fn tone(self) -> Tone {
        let (freq, duration, waveform) = match self {
            SoundEffect::Collect => (800.0, 0.1, Waveform::Sine),
            SoundEffect::PowerUp => (600.0, 0.2, Waveform::Sine),
            SoundEffect::Collision => (200.0, 0.3, Waveform::Sawtooth),
            SoundEffect::LevelUp => (1000.0, 0.15, Waveform::Sine),
            SoundEffect::Shield => (400.0, 0.25, Waveform::Sine),
        };
        Tone {
            freq,
            duration,
            waveform,
        }
    }
}

/// Audio manager for the game. Clones share the same audio context.
#[derive(Clone)]
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::AudioContext>,
    sfx_volume: f32,
    enabled: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Creating the context can fail outside a secure context
        #[cfg(target_arch = "wasm32")]
        let ctx = match web_sys::AudioContext::new() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("Web Audio unavailable: {:?}", e);
                None
            }
        };

        Self {
            #[cfg(target_arch = "wasm32")]
            ctx,
            sfx_volume: 0.7,
            enabled: true,
        }
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Peak gain for an effect played at `volume`
    pub fn effective_volume(&self, volume: f32) -> f32 {
        if !self.enabled {
            0.0
        } else {
            (volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Play a sound effect
    pub fn play_effect(&self, effect: SoundEffect, volume: f32) {
        let vol = self.effective_volume(volume);
        if vol <= 0.0 {
            return;
        }

        #[cfg(target_arch = "wasm32")]
        {
            let Some(ctx) = &self.ctx else { return };
            // A suspended context would queue tones until the next gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                return;
            }
            if play_tone(ctx, effect.tone(), vol).is_none() {
                log::debug!("Failed to play {:?}", effect);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        log::trace!("play {:?} at {:.2}", effect, vol);
    }
}

impl SoundSink for AudioManager {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.play_effect(effect, volume);
    }
}

/// Oscillator through a gain envelope: short linear attack, exponential release
#[cfg(target_arch = "wasm32")]
fn play_tone(ctx: &web_sys::AudioContext, tone: Tone, vol: f32) -> Option<()> {
    use web_sys::OscillatorType;

    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(match tone.waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    });
    osc.frequency().set_value(tone.freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    let t = ctx.current_time();
    gain.gain().set_value_at_time(0.0, t).ok()?;
    gain.gain()
        .linear_ramp_to_value_at_time(vol, t + ATTACK_SECS)
        .ok()?;
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
        .ok()?;

    osc.start_with_when(t).ok()?;
    osc.stop_with_when(t + tone.duration).ok()?;
    Some(())
}
