//! Exploration mode: walk the casino floor and step up to a booth.

use std::cell::RefCell;
use std::rc::Rc;

use memeslot_core::world::{PLAYER_SIZE, PLAYER_SPEED};
use memeslot_core::{Booth, Direction, HeldKeys, Key, World};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

use crate::timer::Timer;

/// One movement step and one walk frame per tick.
pub const TICK_MS: i32 = 100;

/// Community link shown on unfinished booths, set at build time.
fn community_url() -> Option<&'static str> {
    option_env!("TELEGRAM_URL")
}

/// Window listener removed on drop.
struct KeyListener {
    kind: &'static str,
    callback: Closure<dyn FnMut(KeyboardEvent)>,
}

impl KeyListener {
    fn new(kind: &'static str, f: impl FnMut(KeyboardEvent) + 'static) -> Option<Self> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut(KeyboardEvent)>);
        web_sys::window()?
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { kind, callback })
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
        }
    }
}

/// What pressing the interact key near `booth` should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Play(String),
    ComingSoon(String),
}

impl From<&Booth> for Interaction {
    fn from(booth: &Booth) -> Self {
        if booth.available {
            Interaction::Play(booth.id.clone())
        } else {
            Interaction::ComingSoon(booth.name.clone())
        }
    }
}

/// Interact with whatever booth the player stands at.
fn interact(world: &RefCell<World>, on_play: &Callback<String>, panel: &UseStateHandle<Option<String>>) {
    let action = world.borrow().interact().map(Interaction::from);
    match action {
        Some(Interaction::Play(id)) => on_play.emit(id),
        Some(Interaction::ComingSoon(name)) => panel.set(Some(name)),
        None => panel.set(None),
    }
}

#[derive(Properties, PartialEq)]
struct TouchPadProps {
    held: Rc<RefCell<HeldKeys>>,
    on_interact: Callback<()>,
}

/// On-screen arrows for touch devices; a pad is held while pressed.
#[function_component(TouchPad)]
fn touch_pad(props: &TouchPadProps) -> Html {
    let pad = |direction: Direction| {
        let press = |pressed: bool| {
            let held = props.held.clone();
            Callback::from(move |e: PointerEvent| {
                e.prevent_default();
                held.borrow_mut().set(direction, pressed);
            })
        };
        html! {
            <button
                class={classes!("touch-pad", format!("touch-{direction:?}").to_lowercase())}
                onpointerdown={press(true)}
                onpointerup={press(false)}
                onpointerleave={press(false)}
                onpointercancel={press(false)}
            >
                { direction.arrow() }
            </button>
        }
    };
    let onclick = props.on_interact.reform(|_: MouseEvent| ());

    html! {
        <div class="touch-controls">
            { pad(Direction::Up) }
            { pad(Direction::Left) }
            <button class="touch-interact" {onclick}>{ "●" }</button>
            { pad(Direction::Right) }
            { pad(Direction::Down) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CasinoFloorProps {
    /// Fired with the booth id when the player opens a playable booth.
    pub on_play: Callback<String>,
}

#[function_component(CasinoFloor)]
pub fn casino_floor(props: &CasinoFloorProps) -> Html {
    let world = use_mut_ref(World::casino_floor);
    let held = use_mut_ref(HeldKeys::default);
    let panel = use_state(|| None::<String>);
    let redraw = use_force_update();

    {
        let world = world.clone();
        let held = held.clone();
        let panel = panel.clone();
        let on_play = props.on_play.clone();
        use_effect_with((), move |_| {
            let down = KeyListener::new("keydown", {
                let held = held.clone();
                let world = world.clone();
                move |e: KeyboardEvent| match Key::from_code(&e.key()) {
                    Some(Key::Move(direction)) => {
                        e.prevent_default();
                        held.borrow_mut().set(direction, true);
                    }
                    Some(Key::Interact) => {
                        e.prevent_default();
                        interact(&world, &on_play, &panel);
                    }
                    None => {}
                }
            });
            let up = KeyListener::new("keyup", {
                let held = held.clone();
                move |e: KeyboardEvent| {
                    if let Some(Key::Move(direction)) = Key::from_code(&e.key()) {
                        held.borrow_mut().set(direction, false);
                    }
                }
            });
            let ticker = Timer::interval(TICK_MS, move || {
                let keys = *held.borrow();
                let mut world = world.borrow_mut();
                let was_moving = world.player.moving;
                world.tick(&keys);
                if keys.any() || was_moving {
                    redraw.force_update();
                }
            });
            move || drop((down, up, ticker))
        });
    }

    let on_interact = {
        let world = world.clone();
        let panel = panel.clone();
        let on_play = props.on_play.clone();
        Callback::from(move |_: ()| interact(&world, &on_play, &panel))
    };
    let back_to_game = {
        let panel = panel.clone();
        Callback::from(move |_: MouseEvent| panel.set(None))
    };

    let pad_keys = held.clone();
    let world = world.borrow();
    let player = &world.player;
    let near = world.interact().map(|b| b.id.clone());
    let half = PLAYER_SIZE / 2.0;

    html! {
        <div class="casino-floor" style={format!("width:{}px;height:{}px", world.width, world.height)}>
            { for world.booths.iter().map(|b| {
                let class = classes!(
                    "booth",
                    b.available.then_some("available"),
                    (near.as_deref() == Some(b.id.as_str())).then_some("near"),
                );
                html! {
                    <div key={b.id.clone()} {class}
                        style={format!("left:{}px;top:{}px;width:{}px;height:{}px", b.x, b.y, b.width, b.height)}>
                        <div class="booth-name">{ b.name.clone() }</div>
                        <div class="booth-hint">
                            { if b.available { "Press SPACE to play" } else { "Coming Soon" } }
                        </div>
                    </div>
                }
            }) }
            <div
                class={classes!("player", player.moving.then_some("walking"))}
                data-frame={player.frame.to_string()}
                style={format!(
                    "left:{}px;top:{}px;width:{}px;height:{}px",
                    player.x - half, player.y - half, PLAYER_SIZE, PLAYER_SIZE
                )}
            >
                { player.direction.arrow() }
            </div>
            if let Some(name) = &*panel {
                <div class="dialog coming-soon">
                    <h2>{ "COMING SOON!" }</h2>
                    <p>{ format!("{name} is under development. Stay tuned for updates!") }</p>
                    if let Some(url) = community_url() {
                        <a class="community-link" href={url} target="_blank" rel="noopener noreferrer">
                            { "Join Our Telegram" }
                        </a>
                    }
                    <button onclick={back_to_game}>{ "Back to Game" }</button>
                </div>
            }
            <TouchPad held={pad_keys} {on_interact} />
            <p class="floor-help">{ "Arrow keys or WASD to walk, SPACE to interact" }</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_available_booths_play() {
        let world = World::casino_floor();
        let slots = world.booth("slots").unwrap();
        assert_eq!(Interaction::from(slots), Interaction::Play("slots".into()));
        let poker = world.booth("poker").unwrap();
        assert_eq!(
            Interaction::from(poker),
            Interaction::ComingSoon(poker.name.clone())
        );
    }

    #[test]
    fn walking_covers_fifty_pixels_a_second() {
        let steps_per_second = 1000.0 / f64::from(TICK_MS);
        assert_eq!(PLAYER_SPEED * steps_per_second, 50.0);
    }
}
