use crate::referee::game_state::GameState;

/// Out-of-band sink notified after every state transition. A faulting
/// observer is dropped and its absence is durable for the rest of the
/// game — it never sees another call.
pub trait Observer {
    fn update(&mut self, state: &GameState);
    fn game_over(&mut self, state: &GameState);
}

/// Pushes the current state to every registered observer, dropping any
/// that panic. Collect-then-reassign rather than remove-while-iterating,
/// so a fault partway through never skips a later observer.
pub fn notify_all(observers: &mut Vec<Box<dyn Observer>>, state: &GameState) {
    let mut surviving = Vec::with_capacity(observers.len());
    for mut observer in observers.drain(..) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| observer.update(state)));
        if result.is_ok() {
            surviving.push(observer);
        } else {
            log::debug!("dropping observer that faulted on update");
        }
    }
    *observers = surviving;
}

pub fn notify_game_over(observers: &mut Vec<Box<dyn Observer>>, state: &GameState) {
    let mut surviving = Vec::with_capacity(observers.len());
    for mut observer in observers.drain(..) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| observer.game_over(state)));
        if result.is_ok() {
            surviving.push(observer);
        } else {
            log::debug!("dropping observer that faulted on game_over");
        }
    }
    *observers = surviving;
}
