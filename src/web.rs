use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::input::Command;
use crate::log;
use crate::schedule::{GameDriver, Ticker};
use crate::session::{GameEvent, GameSettings};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A browser callback chain: either a `requestAnimationFrame` loop or a
/// `setInterval` timer.
enum BrowserTask {
    AnimationFrame {
        window: web_sys::Window,
        handle: Rc<Cell<Option<i32>>>,
        stopped: Rc<Cell<bool>>,
        callback: FrameCallback,
    },
    Interval {
        window: web_sys::Window,
        handle: i32,
        _callback: Closure<dyn FnMut()>,
    },
}

impl Ticker for BrowserTask {
    fn cancel(&mut self) {
        match self {
            BrowserTask::AnimationFrame {
                window,
                handle,
                stopped,
                callback,
            } => {
                stopped.set(true);
                if let Some(id) = handle.take() {
                    let _ = window.cancel_animation_frame(id);
                }
                // breaks the closure's reference to itself
                let _ = callback.borrow_mut().take();
            }
            BrowserTask::Interval { window, handle, .. } => {
                window.clear_interval_with_handle(*handle);
            }
        }
    }
}

impl Drop for BrowserTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))
}

fn animation_frame_loop(
    window: &web_sys::Window,
    mut on_frame: impl FnMut(f64) + 'static,
) -> Result<BrowserTask, JsValue> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let handle = Rc::new(Cell::new(None));
    let stopped = Rc::new(Cell::new(false));

    let loop_callback = callback.clone();
    let loop_handle = handle.clone();
    let loop_stopped = stopped.clone();
    let loop_window = window.clone();
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |time: f64| {
        if loop_stopped.get() {
            return;
        }
        on_frame(time);
        if loop_stopped.get() {
            return;
        }
        // schedule next frame
        if let Some(cb) = loop_callback.borrow().as_ref() {
            if let Ok(id) = loop_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                loop_handle.set(Some(id));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(cb) = callback.borrow().as_ref() {
        let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        handle.set(Some(id));
    }

    Ok(BrowserTask::AnimationFrame {
        window: window.clone(),
        handle,
        stopped,
        callback,
    })
}

fn interval(
    window: &web_sys::Window,
    period_ms: i32,
    on_tick: impl FnMut() + 'static,
) -> Result<BrowserTask, JsValue> {
    let callback = Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>);
    let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        period_ms,
    )?;
    Ok(BrowserTask::Interval {
        window: window.clone(),
        handle,
        _callback: callback,
    })
}

struct Shared {
    driver: RefCell<GameDriver<BrowserTask>>,
    on_render: js_sys::Function,
    on_game_over: Option<js_sys::Function>,
}

impl Shared {
    fn render(&self) {
        let view = self.driver.borrow().session().snapshot();
        match to_value(&view) {
            Ok(value) => {
                if let Err(e) = self.on_render.call1(&JsValue::NULL, &value) {
                    log(&format!("render callback failed: {e:?}"));
                }
            }
            Err(e) => log(&format!("snapshot serialization failed: {e}")),
        }
    }

    fn on_frame(&self, time_ms: f64) {
        self.driver.borrow_mut().frame(time_ms);
        self.render();
        self.dispatch_events();
    }

    fn on_clock(&self) {
        self.driver.borrow_mut().clock_tick(js_sys::Date::now());
    }

    /// The driver has already stopped both loops by the time a game over shows up.
    fn dispatch_events(&self) {
        let events = self.driver.borrow_mut().take_events();
        for event in events {
            if let GameEvent::GameOver {
                final_score,
                message,
            } = event
            {
                if let Some(cb) = &self.on_game_over {
                    if let Err(e) = cb.call2(
                        &JsValue::NULL,
                        &JsValue::from(final_score),
                        &JsValue::from_str(&message),
                    ) {
                        log(&format!("game over callback failed: {e:?}"));
                    }
                }
            }
        }
    }
}

#[wasm_bindgen]
pub struct GameClient {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl GameClient {
    /// `on_render(view)` runs once per animation frame while a game is running;
    /// `on_game_over(score, message)` runs once when the game ends.
    #[wasm_bindgen(constructor)]
    pub fn new(
        settings: JsValue,
        on_render: js_sys::Function,
        on_game_over: Option<js_sys::Function>,
    ) -> Result<GameClient, JsValue> {
        let settings: GameSettings = if settings.is_undefined() || settings.is_null() {
            GameSettings::default()
        } else {
            from_value(settings).unwrap_or_default()
        };
        Ok(Self {
            shared: Rc::new(Shared {
                driver: RefCell::new(GameDriver::new(settings)),
                on_render,
                on_game_over,
            }),
        })
    }

    /// Starts or restarts a game. Any loop from a previous game is stopped first.
    #[wasm_bindgen(js_name = start)]
    pub fn start(&self) -> Result<(), JsValue> {
        let window = window()?;
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let frame = animation_frame_loop(&window, move |time| {
            if let Some(shared) = weak.upgrade() {
                shared.on_frame(time);
            }
        })?;
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        // on failure `frame` is dropped here, which cancels it
        let clock = interval(&window, 1000, move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_clock();
            }
        })?;
        self.shared
            .driver
            .borrow_mut()
            .start(js_sys::Date::now(), frame, clock);
        // discard the Started event; the view already reflects it
        let _ = self.shared.driver.borrow_mut().take_events();
        self.shared.render();
        Ok(())
    }

    #[wasm_bindgen(js_name = moveLeft)]
    pub fn move_left(&self) -> bool {
        self.command(Command::MoveLeft)
    }

    #[wasm_bindgen(js_name = moveRight)]
    pub fn move_right(&self) -> bool {
        self.command(Command::MoveRight)
    }

    #[wasm_bindgen(js_name = moveDown)]
    pub fn move_down(&self) -> bool {
        self.command(Command::MoveDown)
    }

    #[wasm_bindgen(js_name = rotate)]
    pub fn rotate(&self) -> bool {
        self.command(Command::Rotate)
    }

    /// Routes a `KeyboardEvent.code` through the configured bindings. Returns true
    /// when the key is bound, so the page can `preventDefault`.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, code: &str) -> Result<bool, JsValue> {
        let command = self
            .shared
            .driver
            .borrow()
            .session()
            .settings()
            .controls
            .command_for(code);
        match command {
            Some(Command::Start) => {
                self.start()?;
                Ok(true)
            }
            Some(other) => {
                self.command(other);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.shared.driver.borrow().session().snapshot()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = score)]
    pub fn score(&self) -> u32 {
        self.shared.driver.borrow().session().score()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.shared.driver.borrow().session().is_running()
    }

    fn command(&self, command: Command) -> bool {
        let applied = self
            .shared
            .driver
            .borrow_mut()
            .command(command, js_sys::Date::now());
        // a manual drop can lock onto the spawn row
        self.shared.dispatch_events();
        applied
    }
}
