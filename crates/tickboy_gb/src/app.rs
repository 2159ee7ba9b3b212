use tickboy_common::app::App;
use tickboy_common::key::Key as HostKey;

use crate::machine::Key;
use crate::{GameBoy, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};

/// Frontend-facing wrapper: one emulated frame per `update`.
pub struct GameBoyApp {
    pub gb: GameBoy,
    should_exit: bool,
    frame_counter: u64,
}

impl GameBoyApp {
    pub fn new(gb: GameBoy) -> Self {
        Self {
            gb,
            should_exit: false,
            frame_counter: 0,
        }
    }

    #[inline]
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }
}

/// Z => A, X => B, A or Backspace => Select, S or Enter => Start, arrows
/// => D-pad.
fn joypad_key(key: HostKey) -> Option<Key> {
    match key {
        HostKey::Right => Some(Key::Right),
        HostKey::Left => Some(Key::Left),
        HostKey::Up => Some(Key::Up),
        HostKey::Down => Some(Key::Down),
        HostKey::Z => Some(Key::A),
        HostKey::X => Some(Key::B),
        HostKey::A | HostKey::Backspace => Some(Key::Select),
        HostKey::S | HostKey::Enter => Some(Key::Start),
        HostKey::Space | HostKey::Escape | HostKey::None => None,
    }
}

impl App for GameBoyApp {
    fn init(&mut self) {
        log::info!("Game Boy init");
    }

    fn update(&mut self, screen: &mut [u8]) {
        self.gb.run_frame();
        self.gb.video_frame(screen);
        self.frame_counter = self.frame_counter.wrapping_add(1);

        if self.frame_counter % 60 == 0 {
            let cpu = self.gb.cpu();
            log::debug!(
                "GB: frame={} cycles={} pc=0x{:04X} sp=0x{:04X} ime={} halted={} locked={}",
                self.frame_counter,
                self.gb.cycles(),
                cpu.pc(),
                cpu.sp(),
                cpu.ime(),
                cpu.is_halted(),
                cpu.is_locked(),
            );
        }
    }

    fn handle_key_event(&mut self, key: HostKey, is_down: bool) {
        if key == HostKey::Escape && is_down {
            self.should_exit = true;
            return;
        }
        let Some(key) = joypad_key(key) else {
            return;
        };
        if is_down {
            self.gb.key_pressed(key);
        } else {
            self.gb.key_released(key);
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Game Boy exit after {} frames", self.frame_counter);
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        "TickBoy".to_string()
    }
}
