//! Creator-coin valuation and the wallet screen's derived numbers.

use deso_api::models::{CoinEntry, ExchangeRate, User};

use super::*;
use crate::state::{CoinHoldingView, WalletViewState};
use crate::updates::WalletFetch;

const NANOS_PER_DESO: f64 = 1_000_000_000.0;

/// Reciprocal of the bonding-curve exponent. The backend computes with this
/// exact literal rather than 1/3; keep it verbatim so valuations agree
/// bit-for-bit.
const SELL_CURVE_EXPONENT: f64 = 1.0 / 0.3333333;

/// Nanos of DeSo a holder would receive for selling `amount_held_nanos` of a
/// creator coin, net of the protocol's fixed trading fee (9999/10000).
///
/// A coin with zero circulating supply values to zero (the curve is
/// undefined there, not infinite).
pub(crate) fn estimate_sell_proceeds_nanos(amount_held_nanos: u64, coin_entry: &CoinEntry) -> f64 {
    let supply = coin_entry.coins_in_circulation_nanos as f64;
    if supply <= 0.0 {
        return 0.0;
    }
    let locked = coin_entry.deso_locked_nanos as f64;
    // Selling more than circulates would put the curve base below zero.
    let remaining_fraction = (1.0 - amount_held_nanos as f64 / supply).max(0.0);
    let before_fee = locked * (1.0 - remaining_fraction.powf(SELL_CURVE_EXPONENT));
    before_fee * (100.0 * 100.0 - 1.0) / (100.0 * 100.0)
}

/// Nanos of DeSo → USD via the node's cents-per-DeSo rate.
pub(crate) fn deso_nanos_to_usd(nanos: f64, exchange_rate: &ExchangeRate) -> f64 {
    nanos / NANOS_PER_DESO * (exchange_rate.usd_cents_per_deso / 100.0)
}

/// Fixed two decimals for fiat amounts.
pub(crate) fn format_fiat(value: f64) -> String {
    format!("{value:.2}")
}

/// Fixed five decimals for DeSo amounts.
pub(crate) fn format_deso(nanos: u64) -> String {
    format!("{:.5}", nanos as f64 / NANOS_PER_DESO)
}

/// Assemble the wallet screen from one joined fetch. Holdings are valued by
/// their sell proceeds and sorted by fiat value, descending — the one place
/// the client re-orders server data.
pub(crate) fn build_wallet_view(fetch: &WalletFetch, fiat_code: &str) -> WalletViewState {
    let user: &User = &fetch.user;
    let rate = &fetch.exchange_rate;
    let usd_to_fiat = fetch.usd_to_fiat;

    let mut holdings: Vec<CoinHoldingView> = Vec::new();
    let mut total_fiat = 0.0;
    for holding in &user.users_you_hodl {
        let Some(profile) = holding.profile_entry_response.as_ref() else {
            continue;
        };
        let proceeds_nanos = estimate_sell_proceeds_nanos(holding.balance_nanos, &profile.coin_entry);
        let fiat_value = deso_nanos_to_usd(proceeds_nanos, rate) * usd_to_fiat;
        let coins = holding.balance_nanos as f64 / NANOS_PER_DESO;
        let coin_price_fiat = if coins > 0.0 { fiat_value / coins } else { 0.0 };
        total_fiat += fiat_value;
        holdings.push(CoinHoldingView {
            holding: holding.clone(),
            fiat_value,
            coin_price_fiat,
        });
    }
    holdings.sort_by(|a, b| b.fiat_value.total_cmp(&a.fiat_value));

    let balance_fiat = deso_nanos_to_usd(user.balance_nanos as f64, rate) * usd_to_fiat;
    let deso_price_fiat = deso_nanos_to_usd(NANOS_PER_DESO, rate) * usd_to_fiat;

    WalletViewState {
        balance_nanos: user.balance_nanos,
        balance_deso: format_deso(user.balance_nanos),
        balance_fiat: format_fiat(balance_fiat),
        deso_price_fiat: format_fiat(deso_price_fiat),
        total_coin_value_fiat: format_fiat(total_fiat),
        fiat_code: fiat_code.to_string(),
        holdings,
    }
}

/// The wallet's Purchased/Received tabs. A creator always counts as having
/// "purchased" their own coin.
pub(crate) fn filter_holdings(holdings: &[CoinHoldingView], purchased: bool) -> Vec<CoinHoldingView> {
    holdings
        .iter()
        .filter(|view| {
            view.holding.has_purchased == purchased
                || (purchased
                    && view.holding.creator_public_key_base58_check
                        == view.holding.hodler_public_key_base58_check)
        })
        .cloned()
        .collect()
}

impl AppCore {
    pub(super) fn refresh_wallet(&mut self) {
        let Some(public_key) = self.state.auth.public_key().map(str::to_string) else {
            self.toast("Please log in first");
            return;
        };
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }
        if self.state.busy.loading_wallet {
            return;
        }

        self.wallet_token = self.wallet_token.wrapping_add(1);
        let token = self.wallet_token;
        self.set_busy(|b| b.loading_wallet = true);

        let client = self.client.clone();
        let cache = self.cache.clone();
        let tx = self.core_sender.clone();
        let fiat_currency = self.config.fiat_currency();
        let fallback_rate = self.config.fiat_rate_fallback();
        let alive = self.session.as_ref().map(|s| s.alive.clone());

        self.runtime.spawn(async move {
            // The exchange rate is force-reloaded here; the wallet is the one
            // screen that must not show a stale conversion.
            let rate_fut = cache.exchange_rate.reload(|| client.get_exchange_rate());
            let users_fut = client.get_users_stateless(std::slice::from_ref(&public_key));
            let fiat_fut = fetch_usd_to_fiat(&client, &fiat_currency, fallback_rate);
            let (rate, users, usd_to_fiat) =
                futures_util::join!(rate_fut, users_fut, fiat_fut);

            let result = match (rate, users) {
                (Ok(exchange_rate), Ok(users)) => match users.into_iter().next() {
                    Some(user) => Ok(WalletFetch {
                        user: Box::new(user),
                        exchange_rate,
                        usd_to_fiat,
                    }),
                    None => Err(deso_api::ApiError::Validation(
                        "user not found".to_string(),
                    )),
                },
                (Err(err), _) | (_, Err(err)) => Err(err),
            };

            if alive.map(|a| a.load(Ordering::SeqCst)).unwrap_or(false) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::WalletLoaded {
                    token,
                    result,
                })));
            }
        });
    }

    pub(super) fn apply_wallet_loaded(
        &mut self,
        token: u64,
        result: Result<WalletFetch, deso_api::ApiError>,
    ) {
        if token != self.wallet_token {
            return;
        }
        self.set_busy(|b| b.loading_wallet = false);
        match result {
            Ok(fetch) => {
                // The joined fetch doubles as a user refresh.
                self.cache.user.set((*fetch.user).clone());
                self.apply_user_snapshot(&fetch.user);
                self.state.wallet =
                    Some(build_wallet_view(&fetch, &self.config.fiat_currency()));
                self.emit_state();
            }
            Err(err) => {
                tracing::warn!(err = %err, "wallet load failed");
                self.toast(err.user_message());
            }
        }
    }
}

/// Secondary USD → local-currency rate from the open exchange-rate API.
/// Falls back to the configured rate when the fetch fails; a wrong-but-close
/// conversion beats an empty wallet screen.
async fn fetch_usd_to_fiat(client: &DesoClient, fiat_currency: &str, fallback: f64) -> f64 {
    if fiat_currency.eq_ignore_ascii_case("USD") {
        return 1.0;
    }
    let rates: Result<serde_json::Value, _> = client
        .get_absolute("https://open.er-api.com/v6/latest/USD")
        .await;
    match rates {
        Ok(value) => value
            .get("rates")
            .and_then(|r| r.get(fiat_currency))
            .and_then(|v| v.as_f64())
            .unwrap_or(fallback),
        Err(err) => {
            tracing::warn!(err = %err, "fiat rate fetch failed, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deso_api::models::{CreatorCoinHodler, ProfileEntryResponse};

    fn coin(locked: u64, supply: u64) -> CoinEntry {
        CoinEntry {
            deso_locked_nanos: locked,
            coins_in_circulation_nanos: supply,
            ..Default::default()
        }
    }

    #[test]
    fn selling_nothing_yields_nothing() {
        let entry = coin(5_000_000_000, 10_000_000_000);
        assert_eq!(estimate_sell_proceeds_nanos(0, &entry), 0.0);
    }

    #[test]
    fn selling_the_full_supply_drains_the_reserve_minus_fee() {
        let entry = coin(5_000_000_000, 10_000_000_000);
        let proceeds = estimate_sell_proceeds_nanos(10_000_000_000, &entry);
        let expected = 5_000_000_000.0 * 9999.0 / 10_000.0;
        assert!((proceeds - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_supply_is_worth_zero_not_nan() {
        let entry = coin(5_000_000_000, 0);
        let proceeds = estimate_sell_proceeds_nanos(1_000, &entry);
        assert_eq!(proceeds, 0.0);
    }

    #[test]
    fn overselling_clamps_instead_of_going_nan() {
        let entry = coin(5_000_000_000, 10_000_000_000);
        let proceeds = estimate_sell_proceeds_nanos(20_000_000_000, &entry);
        assert!(proceeds.is_finite());
        let full = estimate_sell_proceeds_nanos(10_000_000_000, &entry);
        assert!((proceeds - full).abs() < 1e-6);
    }

    #[test]
    fn partial_sales_price_below_the_linear_share() {
        // The curve is convex: half the supply returns more than half the
        // reserve would suggest under the final fee, but stays below the
        // full reserve.
        let entry = coin(8_000_000_000, 16_000_000_000);
        let half = estimate_sell_proceeds_nanos(8_000_000_000, &entry);
        assert!(half > 0.0);
        assert!(half < 8_000_000_000.0);
    }

    #[test]
    fn nanos_convert_through_cents_per_deso() {
        let rate = ExchangeRate {
            usd_cents_per_deso: 12_345.0,
            ..Default::default()
        };
        let usd = deso_nanos_to_usd(2_000_000_000.0, &rate);
        assert!((usd - 246.90).abs() < 1e-9);
        assert_eq!(format_fiat(usd), "246.90");
    }

    #[test]
    fn deso_balance_renders_five_decimals() {
        assert_eq!(format_deso(1_234_560_000), "1.23456");
        assert_eq!(format_deso(0), "0.00000");
    }

    fn holding(creator: &str, hodler: &str, balance: u64, purchased: bool) -> CreatorCoinHodler {
        CreatorCoinHodler {
            creator_public_key_base58_check: creator.to_string(),
            hodler_public_key_base58_check: hodler.to_string(),
            balance_nanos: balance,
            has_purchased: purchased,
            profile_entry_response: Some(ProfileEntryResponse {
                public_key_base58_check: creator.to_string(),
                coin_entry: coin(balance * 2, balance * 4),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn wallet_view_sorts_holdings_by_value_descending() {
        let fetch = WalletFetch {
            user: Box::new(User {
                public_key_base58_check: "BC1me".into(),
                balance_nanos: 3_000_000_000,
                users_you_hodl: vec![
                    holding("BC1small", "BC1me", 1_000_000_000, true),
                    holding("BC1large", "BC1me", 9_000_000_000, true),
                ],
                ..Default::default()
            }),
            exchange_rate: ExchangeRate {
                usd_cents_per_deso: 10_000.0,
                ..Default::default()
            },
            usd_to_fiat: 1.0,
        };

        let view = build_wallet_view(&fetch, "USD");
        assert_eq!(view.balance_deso, "3.00000");
        assert_eq!(view.holdings.len(), 2);
        assert_eq!(
            view.holdings[0].holding.creator_public_key_base58_check,
            "BC1large"
        );
        assert!(view.holdings[0].fiat_value > view.holdings[1].fiat_value);
    }

    #[test]
    fn purchased_tab_includes_own_coin_even_if_not_purchased() {
        let views: Vec<CoinHoldingView> = [
            holding("BC1me", "BC1me", 10, false),
            holding("BC1other", "BC1me", 10, false),
            holding("BC1bought", "BC1me", 10, true),
        ]
        .into_iter()
        .map(|holding| CoinHoldingView {
            holding,
            fiat_value: 0.0,
            coin_price_fiat: 0.0,
        })
        .collect();

        let purchased = filter_holdings(&views, true);
        let received = filter_holdings(&views, false);
        let creators =
            |set: &[CoinHoldingView]| -> Vec<String> {
                set.iter()
                    .map(|v| v.holding.creator_public_key_base58_check.clone())
                    .collect()
            };
        assert_eq!(creators(&purchased), vec!["BC1me", "BC1bought"]);
        assert_eq!(creators(&received), vec!["BC1me", "BC1other"]);
    }
}
