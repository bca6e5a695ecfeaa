/// Destination for promoted triggers.
///
/// Emission is fire-and-forget: implementations report their own failures
/// and the loop never waits on or inspects the result.
pub trait ActionSink {
    fn play_pause(&mut self);
}
