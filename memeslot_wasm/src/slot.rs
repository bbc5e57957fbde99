use std::cell::RefCell;
use std::rc::Rc;

use memeslot_core::Symbol;
use memeslot_shared::{Notification, Variant, WalletInfo};
use rand::Rng;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::timer::Timer;

/// How long each reel keeps cycling before it settles, before its stagger.
pub const SPIN_MS: u32 = 2000;
/// Stagger between neighbouring reels.
pub const REEL_DELAY_MS: u32 = 200;
const TICK_MS: i32 = 100;

fn symbol_label(name: &str) -> String {
    name.parse::<Symbol>()
        .map(|s| s.emoji().to_string())
        .unwrap_or_else(|_| name.to_string())
}

#[derive(Properties, PartialEq)]
pub struct SlotSymbolProps {
    pub symbol: String,
    #[prop_or_default]
    pub winning: bool,
}

#[function_component(SlotSymbol)]
pub fn slot_symbol(props: &SlotSymbolProps) -> Html {
    let class = classes!("slot-symbol", props.winning.then_some("winning"));
    html! {
        <div {class} title={props.symbol.clone()}>
            <span class="slot-symbol-glyph">{ symbol_label(&props.symbol) }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SlotReelProps {
    pub spinning: bool,
    pub final_symbol: String,
    pub delay_ms: u32,
    #[prop_or_default]
    pub winning: bool,
}

#[function_component(SlotReel)]
pub fn slot_reel(props: &SlotReelProps) -> Html {
    let current = use_state(|| props.final_symbol.clone());
    let animating = use_state(|| false);

    {
        let current = current.clone();
        let animating = animating.clone();
        let delay = props.delay_ms;
        use_effect_with(
            (props.spinning, props.final_symbol.clone()),
            move |(spinning, final_symbol)| {
                let ticker: Rc<RefCell<Option<Timer>>> = Rc::new(RefCell::new(None));
                let mut stop = None;
                if *spinning {
                    animating.set(true);
                    *ticker.borrow_mut() = Timer::interval(TICK_MS, {
                        let current = current.clone();
                        move || {
                            let i = rand::thread_rng().gen_range(0..Symbol::ALL.len());
                            current.set(Symbol::ALL[i].name().to_string());
                        }
                    });
                    stop = Timer::timeout((SPIN_MS + delay) as i32, {
                        let ticker = ticker.clone();
                        let final_symbol = final_symbol.clone();
                        move || {
                            ticker.borrow_mut().take();
                            current.set(final_symbol);
                            animating.set(false);
                        }
                    });
                } else {
                    current.set(final_symbol.clone());
                    animating.set(false);
                }
                move || {
                    ticker.borrow_mut().take();
                    drop(stop);
                }
            },
        );
    }

    html! {
        <div class={classes!("slot-reel", (*animating).then_some("animating"))}>
            <SlotSymbol symbol={(*current).clone()} winning={props.winning && !*animating} />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GameBoardProps {
    pub spinning: bool,
    pub reels: Vec<String>,
}

#[function_component(GameBoard)]
pub fn game_board(props: &GameBoardProps) -> Html {
    let winning = props.reels.len() == 3 && props.reels.iter().all(|s| *s == props.reels[0]);
    html! {
        <div class="game-board">
            { for props.reels.iter().enumerate().map(|(i, symbol)| html! {
                <SlotReel
                    key={i}
                    spinning={props.spinning}
                    final_symbol={symbol.clone()}
                    delay_ms={i as u32 * REEL_DELAY_MS}
                    winning={winning && !props.spinning}
                />
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct BetControlsProps {
    pub bet: String,
    pub token: String,
    pub tokens: Vec<String>,
    pub min_bet: f64,
    pub bet_step: f64,
    pub spinning: bool,
    pub on_bet_change: Callback<String>,
    pub on_token_change: Callback<String>,
    pub on_spin: Callback<()>,
}

#[function_component(BetControls)]
pub fn bet_controls(props: &BetControlsProps) -> Html {
    let oninput = props.on_bet_change.reform(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        input.value()
    });
    let onchange = props.on_token_change.reform(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        select.value()
    });
    let onclick = props.on_spin.reform(|_: MouseEvent| ());

    html! {
        <div class="bet-controls">
            <div class="bet-row">
                <input
                    type="number"
                    placeholder="Bet Amount"
                    value={props.bet.clone()}
                    min={props.min_bet.to_string()}
                    step={props.bet_step.to_string()}
                    disabled={props.spinning}
                    {oninput}
                />
                <select disabled={props.spinning} {onchange}>
                    { for props.tokens.iter().map(|t| html! {
                        <option value={t.clone()} selected={*t == props.token}>{ t.clone() }</option>
                    }) }
                </select>
            </div>
            <button class="spin-button" disabled={props.spinning} {onclick}>
                { if props.spinning { "Spinning..." } else { "SPIN!" } }
            </button>
        </div>
    }
}

/// `ABCDEF...WXYZ` form of an address.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[derive(Properties, PartialEq)]
pub struct WalletConnectProps {
    pub wallet: WalletInfo,
    pub on_connect: Callback<()>,
}

#[function_component(WalletConnect)]
pub fn wallet_connect(props: &WalletConnectProps) -> Html {
    let onclick = props.on_connect.reform(|_: MouseEvent| ());
    let label = match (&props.wallet.address, props.wallet.connected) {
        (Some(address), true) => short_address(address),
        _ => "Connect Wallet".to_string(),
    };
    html! {
        <div class="wallet-connect">
            <button {onclick}>{ label }</button>
            if props.wallet.connected {
                <div class="wallet-balance">{ format!("Balance: {:.4} SOL", props.wallet.balance) }</div>
            }
        </div>
    }
}

/// Payout line for the instructions, e.g. "3x your bet amount".
pub fn winnings_text(win_multiplier: f64) -> String {
    format!(
        "Match three identical symbols to win! Your winnings will be {win_multiplier}x your bet amount."
    )
}

#[derive(Properties, PartialEq)]
pub struct InstructionsDialogProps {
    pub win_multiplier: f64,
}

#[function_component(InstructionsDialog)]
pub fn instructions_dialog(props: &InstructionsDialogProps) -> Html {
    let open = use_state(|| false);
    let toggle = {
        let open = open.clone();
        Callback::from(move |_: MouseEvent| open.set(!*open))
    };
    html! {
        <>
            <button class="help-button" onclick={toggle.clone()}>{ "?" }</button>
            if *open {
                <div class="dialog" role="dialog">
                    <h2>{ "How to Play MEME Slot Machine" }</h2>
                    <h3>{ "Step 1: Set Up Your Wallet" }</h3>
                    <p>{ "Point the server at a Solana keypair (PLAYER_KEYPAIR) or run it with --offline for demo funds." }</p>
                    <h3>{ "Step 2: Connect Your Wallet" }</h3>
                    <p>{ "Click \"Connect Wallet\" in the top-right corner. Your address and balance appear when connected." }</p>
                    <h3>{ "Step 3: Place Your Bet" }</h3>
                    <p>{ "Enter your bet amount, select your token and click \"SPIN!\" to start playing." }</p>
                    <h3>{ "Winning" }</h3>
                    <p>{ winnings_text(props.win_multiplier) }</p>
                    <button onclick={toggle}>{ "Close" }</button>
                </div>
            }
        </>
    }
}

#[derive(Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub notification: Notification,
}

#[derive(Properties, PartialEq)]
pub struct ToasterProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(Toaster)]
pub fn toaster(props: &ToasterProps) -> Html {
    html! {
        <ol class="toaster">
            { for props.toasts.iter().map(|t| {
                let id = t.id;
                let onclick = props.on_dismiss.reform(move |_: MouseEvent| id);
                let class = classes!("toast", (t.notification.variant == Variant::Destructive).then_some("destructive"));
                html! {
                    <li key={id} {class}>
                        <strong>{ t.notification.title.clone() }</strong>
                        <p>{ t.notification.description.clone() }</p>
                        <button class="toast-close" {onclick}>{ "×" }</button>
                    </li>
                }
            }) }
        </ol>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_shortened() {
        assert_eq!(
            short_address("4iLbQpA51ZJN5yFf5RoswabcvqWxsninf4GJGGh24o3J"),
            "4iLbQp...4o3J"
        );
        assert_eq!(short_address("short"), "short");
    }

    #[test]
    fn winnings_follow_the_multiplier() {
        assert!(winnings_text(3.0).contains("3x your bet"));
        assert!(winnings_text(5.0).contains("5x your bet"));
        assert!(winnings_text(2.5).contains("2.5x your bet"));
    }

    #[test]
    fn symbols_render_as_emoji() {
        assert_eq!(symbol_label("doge"), Symbol::Doge.emoji());
        assert_eq!(symbol_label("bonk"), "bonk");
    }
}
