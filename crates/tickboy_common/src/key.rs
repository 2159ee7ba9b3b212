/// Host keys a frontend can forward to an [`App`](crate::app::App).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Z,
    X,
    A,
    S,
    Enter,
    Space,
    Backspace,
    Escape,
    None,
}
