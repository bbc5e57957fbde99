//! Browser front-end: the classic slot machine screen and the casino floor.

mod api;
mod floor;
mod slot;
mod sound;
mod timer;

use std::rc::Rc;

use memeslot_core::{Token, INITIAL_REELS};
use memeslot_shared::{GameConfig, Notification, SpinRequest, WalletInfo};
use wasm_bindgen::prelude::*;
use yew::prelude::*;

use crate::api::Api;
use crate::floor::CasinoFloor;
use crate::slot::{
    BetControls, GameBoard, InstructionsDialog, Toast, Toaster, WalletConnect, REEL_DELAY_MS,
    SPIN_MS,
};
use crate::sound::{Sound, Sounds};
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Classic,
    Floor,
}

#[derive(Default, PartialEq)]
struct Toasts {
    next_id: u32,
    items: Vec<Toast>,
}

enum ToastAction {
    Push(Notification),
    Dismiss(u32),
}

impl Reducible for Toasts {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: ToastAction) -> Rc<Self> {
        let mut items = self.items.clone();
        let mut next_id = self.next_id;
        match action {
            ToastAction::Push(notification) => {
                items.push(Toast {
                    id: next_id,
                    notification,
                });
                next_id += 1;
            }
            ToastAction::Dismiss(id) => items.retain(|t| t.id != id),
        }
        Rc::new(Toasts { next_id, items })
    }
}

fn disconnected() -> WalletInfo {
    WalletInfo {
        connected: false,
        address: None,
        balance: 0.0,
        provider: None,
    }
}

fn initial_reels() -> Vec<String> {
    INITIAL_REELS.iter().map(|s| s.name().to_string()).collect()
}

#[function_component(App)]
fn app() -> Html {
    let api = use_memo((), |_| Api::default());
    let config = use_state(|| None::<GameConfig>);
    let wallet = use_state(disconnected);
    let reels = use_state(initial_reels);
    let bet = use_state(|| "0.1".to_string());
    let token = use_state(|| Token::Sol.symbol().to_string());
    let pending = use_state(|| false);
    let spinning = use_state(|| false);
    let mode = use_state(|| Mode::Classic);
    let toasts = use_reducer(Toasts::default);
    let settle = use_mut_ref(|| None::<Timer>);
    let sounds = use_memo((), |_| Sounds::load());

    {
        let api = api.clone();
        let config = config.clone();
        let wallet = wallet.clone();
        let reels = reels.clone();
        let toasts = toasts.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api.config().await {
                    Ok(c) => config.set(Some(c)),
                    Err(n) => toasts.dispatch(ToastAction::Push(n)),
                }
                if let Ok(state) = api.state().await {
                    wallet.set(state.wallet);
                    reels.set(state.reels);
                }
            });
        });
    }

    let on_connect = {
        let api = api.clone();
        let wallet = wallet.clone();
        let toasts = toasts.clone();
        Callback::from(move |_: ()| {
            let api = api.clone();
            let wallet = wallet.clone();
            let toasts = toasts.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api.connect().await {
                    Ok(resp) => {
                        wallet.set(resp.wallet);
                        toasts.dispatch(ToastAction::Push(resp.notification));
                    }
                    Err(n) => toasts.dispatch(ToastAction::Push(n)),
                }
            });
        })
    };

    let on_disconnect = {
        let api = api.clone();
        let wallet = wallet.clone();
        Callback::from(move |_: MouseEvent| {
            let api = api.clone();
            let wallet = wallet.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Ok(info) = api.disconnect().await {
                    wallet.set(info);
                }
            });
        })
    };

    let on_spin = {
        let api = api.clone();
        let wallet = wallet.clone();
        let reels = reels.clone();
        let bet = bet.clone();
        let token = token.clone();
        let pending = pending.clone();
        let spinning = spinning.clone();
        let toasts = toasts.clone();
        let settle = settle.clone();
        let sounds = sounds.clone();
        Callback::from(move |_: ()| {
            if *pending || *spinning {
                return;
            }
            pending.set(true);
            let req = SpinRequest {
                bet: (*bet).clone(),
                token: (*token).clone(),
                client_seed: None,
            };
            let api = api.clone();
            let wallet = wallet.clone();
            let reels = reels.clone();
            let pending = pending.clone();
            let spinning = spinning.clone();
            let toasts = toasts.clone();
            let settle = settle.clone();
            let sounds = sounds.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let resp = api.spin(&req).await;
                pending.set(false);
                match resp {
                    Ok(resp) => {
                        reels.set(resp.reels);
                        wallet.set(WalletInfo {
                            balance: resp.balance,
                            ..(*wallet).clone()
                        });
                        spinning.set(true);
                        sounds.play(Sound::Spin);
                        let result = Sound::for_payout(resp.payout);
                        let notifications = resp.notifications;
                        // results show once the last reel has stopped
                        *settle.borrow_mut() =
                            Timer::timeout((SPIN_MS + 2 * REEL_DELAY_MS) as i32, move || {
                                spinning.set(false);
                                sounds.play(result);
                                for n in notifications {
                                    toasts.dispatch(ToastAction::Push(n));
                                }
                            });
                    }
                    Err(n) => toasts.dispatch(ToastAction::Push(n)),
                }
            });
        })
    };

    let on_dismiss = {
        let toasts = toasts.clone();
        Callback::from(move |id: u32| toasts.dispatch(ToastAction::Dismiss(id)))
    };

    let on_play = {
        let mode = mode.clone();
        Callback::from(move |_booth: String| mode.set(Mode::Classic))
    };

    let toggle_mode = {
        let mode = mode.clone();
        Callback::from(move |_: MouseEvent| {
            mode.set(match *mode {
                Mode::Classic => Mode::Floor,
                Mode::Floor => Mode::Classic,
            })
        })
    };

    let (tokens, min_bet, bet_step, win_multiplier) = match &*config {
        Some(c) => (c.tokens.clone(), c.min_bet, c.bet_step, c.win_multiplier),
        None => (
            Token::ALL.iter().map(|t| t.symbol().to_string()).collect(),
            memeslot_core::bet::DEFAULT_MIN_BET,
            memeslot_core::bet::DEFAULT_BET_STEP,
            memeslot_core::paytable::THREE_OF_A_KIND_MULTIPLIER,
        ),
    };

    html! {
        <div class="app">
            <header class="banner"><h1>{ "🚀 WIN THE MEGA JACKPOT 💎" }</h1></header>
            <nav class="top-bar">
                <button class="mode-toggle" onclick={toggle_mode}>
                    { if *mode == Mode::Classic { "Enter Metaverse" } else { "Classic Mode" } }
                </button>
                <WalletConnect wallet={(*wallet).clone()} on_connect={on_connect} />
                if wallet.connected {
                    <button class="disconnect" onclick={on_disconnect}>{ "Disconnect" }</button>
                }
            </nav>
            <main>
                if *mode == Mode::Classic {
                    <section class="slot-machine">
                        <h2>{ "MEME Slot Machine" }</h2>
                        <GameBoard spinning={*spinning} reels={(*reels).clone()} />
                        <BetControls
                            bet={(*bet).clone()}
                            token={(*token).clone()}
                            {tokens}
                            {min_bet}
                            {bet_step}
                            spinning={*pending || *spinning}
                            on_bet_change={{ let bet = bet.clone(); Callback::from(move |v: String| bet.set(v)) }}
                            on_token_change={{ let token = token.clone(); Callback::from(move |v: String| token.set(v)) }}
                            {on_spin}
                        />
                    </section>
                } else {
                    <CasinoFloor {on_play} />
                }
            </main>
            <InstructionsDialog {win_multiplier} />
            <Toaster toasts={toasts.items.clone()} {on_dismiss} />
            <footer><p>{ "🎰 SPIN TO WIN BIG! 💰 MEGA PRIZES AWAIT! 🎯" }</p></footer>
        </div>
    }
}

#[wasm_bindgen(start)]
pub fn run() {
    yew::Renderer::<App>::new().render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_push_and_dismiss() {
        let toasts = Rc::new(Toasts::default());
        let toasts = toasts.reduce(ToastAction::Push(Notification::info("a", "1")));
        let toasts = toasts.reduce(ToastAction::Push(Notification::error("b", "2")));
        assert_eq!(toasts.items.len(), 2);
        let toasts = toasts.reduce(ToastAction::Dismiss(0));
        assert_eq!(toasts.items.len(), 1);
        assert_eq!(toasts.items[0].notification.title, "b");
        assert_eq!(toasts.next_id, 2);
    }

    #[test]
    fn starts_on_the_initial_reels() {
        assert_eq!(initial_reels(), vec!["doge", "shib", "pepe"]);
    }
}
