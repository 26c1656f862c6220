/// Sound engine: procedural chiptune cues via rodio.
///
/// Every cue is rendered once into an in-memory WAV buffer at init. Each cue
/// owns at most one live Sink, which is what `is_playing` inspects; the
/// restart rule itself lives in `sim::cue::play_cue`.
///
/// Build without the "sound" feature to get a silent stub.

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::{trace, warn};

    use overworld::sim::cue::{Cue, CuePlayer};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Cue, Arc<Vec<u8>>>,
        sinks: HashMap<Cue, Sink>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "audio_output_unavailable");
                    return None;
                }
            };
            let buffers = Cue::ALL
                .into_iter()
                .map(|cue| (cue, Arc::new(make_wav(&render(cue)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers, sinks: HashMap::new() })
        }
    }

    impl CuePlayer for SoundEngine {
        fn is_playing(&self, cue: Cue) -> bool {
            self.sinks.get(&cue).map_or(false, |s| !s.empty())
        }

        fn start(&mut self, cue: Cue) {
            let Some(buf) = self.buffers.get(&cue) else { return };
            if let Some(old) = self.sinks.remove(&cue) {
                old.stop();
            }
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    warn!(cue = cue.name(), error = %e, "sink_create_failed");
                    return;
                }
            };
            match rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                Ok(src) => {
                    sink.append(src);
                    trace!(cue = cue.name(), "cue_started");
                    self.sinks.insert(cue, sink);
                }
                Err(e) => warn!(cue = cue.name(), error = %e, "cue_decode_failed"),
            }
        }
    }

    pub(super) fn render(cue: Cue) -> Vec<f32> {
        match cue {
            Cue::Victory => gen_victory(),
            Cue::Bump => gen_bump(),
            Cue::Enter => gen_enter(),
            Cue::Swamp => gen_swamp(),
            Cue::Enemy => gen_enemy(),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    fn samples_for(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Square-ish voice: fundamental plus a touch of the third harmonic.
    fn voice(t: f32, freq: f32) -> f32 {
        (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3
    }

    fn sequence(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, dur) in notes {
            let n = samples_for(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                out.push(voice(t, freq) * env * volume);
            }
        }
        out
    }

    /// Victory: rising C-major fanfare with a held top note.
    fn gen_victory() -> Vec<f32> {
        let mut out = sequence(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1)], 0.3);
        let n = samples_for(0.35);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            out.push(voice(t, 1047.0) * env * 0.3);
        }
        out
    }

    /// Bump: low thud with a little noise.
    fn gen_bump() -> Vec<f32> {
        let n = samples_for(0.09);
        let mut lcg: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                lcg = lcg.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (lcg as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let tone = (t * (140.0 - p * 60.0) * TAU).sin();
                (tone * 0.7 + noise * 0.3) * (1.0 - p).powf(1.5) * 0.4
            })
            .collect()
    }

    /// Enter: two-note chime.
    fn gen_enter() -> Vec<f32> {
        sequence(&[(784.0, 0.08), (1175.0, 0.18)], 0.25)
    }

    /// Swamp: short wet downward squelch.
    fn gen_swamp() -> Vec<f32> {
        let n = samples_for(0.14);
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 320.0 - p * 200.0;
                let wobble = 1.0 + (t * 40.0 * TAU).sin() * 0.3;
                (t * freq * wobble * TAU).sin() * (1.0 - p).powf(0.7) * 0.3
            })
            .collect()
    }

    /// Enemy: ominous descending minor line.
    fn gen_enemy() -> Vec<f32> {
        sequence(&[(440.0, 0.1), (415.0, 0.1), (392.0, 0.1), (311.0, 0.3)], 0.3)
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * num_channels as u32 * bits_per_sample as u32 / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: silent stub when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
}

#[cfg(not(feature = "sound"))]
impl overworld::sim::cue::CuePlayer for SoundEngine {
    fn is_playing(&self, _cue: overworld::sim::cue::Cue) -> bool { false }
    fn start(&mut self, _cue: overworld::sim::cue::Cue) {}
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::{make_wav, render};
    use overworld::sim::cue::Cue;

    #[test]
    fn every_cue_renders_audible_samples() {
        for cue in Cue::ALL {
            let samples = render(cue);
            assert!(!samples.is_empty(), "{}", cue.name());
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
            assert!(samples.iter().any(|s| s.abs() > 0.01));
        }
    }

    #[test]
    fn wav_header_matches_payload() {
        let wav = make_wav(&[0.0, 0.5, -0.5]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
    }
}
