use anyhow::Context;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use log::warn;
use triggercore::interface::ActionSink;

/// Presses the system media play/pause key through the OS input layer.
pub struct MediaKeySink {
    enigo: Enigo,
}

impl MediaKeySink {
    pub fn new() -> anyhow::Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|err| anyhow::anyhow!("{err:?}"))
            .context("connecting to the system input layer")?;
        Ok(Self { enigo })
    }
}

impl ActionSink for MediaKeySink {
    fn play_pause(&mut self) {
        if let Err(err) = self.enigo.key(Key::MediaPlayPause, Direction::Click) {
            warn!("Play/pause key press failed: {:?}", err);
        }
    }
}
