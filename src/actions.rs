//! Typed signable actions
//!
//! Each action is one in-memory record with two projections:
//! - `to_message`: the stringly-typed EIP-712 map (explicit widths)
//! - `to_body`: the JSON sent to the exchange (native numbers and booleans,
//!   `Price`/`Quantity` kept as strings since they may exceed 2^53)
//!
//! Account and sub-account come from the client through `AccountContext`.

use std::time::{SystemTime, UNIX_EPOCH};

use ethers::types::Address;
use ethers::utils::to_checksum;
use serde_json::{json, Value};

use crate::config::constants::{LOGIN_FORWARD_DATE_MS, LOGIN_MESSAGE};
use crate::error::ClientResult;
use crate::signing::{AccountSigner, Eip712Domain, PrimaryType, SignableMessage};
use crate::types::{OrderType, TimeInForce};

/// Current UNIX time in milliseconds; 0 if the clock is before the epoch
pub fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Account the action is performed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountContext {
    pub address: Address,
    pub sub_account_id: u8,
}

impl AccountContext {
    pub fn new(address: Address, sub_account_id: u8) -> Self {
        Self {
            address,
            sub_account_id,
        }
    }

    /// EIP-55 account string
    pub fn account(&self) -> String {
        to_checksum(&self.address, None)
    }
}

pub trait SignableAction {
    const PRIMARY_TYPE: PrimaryType;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage;

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value;
}

/// Sign an action and return its wire body with the signature attached
pub fn sign_action<A: SignableAction>(
    signer: &AccountSigner,
    domain: &Eip712Domain,
    ctx: &AccountContext,
    action: &A,
) -> ClientResult<Value> {
    let message = action.to_message(ctx);
    let signature = signer.sign_typed(domain, A::PRIMARY_TYPE, &message)?;
    Ok(action.to_body(ctx, &signature))
}

// =============================================================================
// Session Login
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub message: String,
    /// UNIX milliseconds
    pub timestamp: u64,
}

impl Login {
    /// Login forward-dated from `now_ms` by the 10 s server tolerance
    pub fn at(now_ms: u64) -> Self {
        Self {
            message: LOGIN_MESSAGE.to_string(),
            timestamp: now_ms.saturating_add(LOGIN_FORWARD_DATE_MS),
        }
    }

    pub fn now() -> Self {
        Self::at(current_time_ms())
    }
}

impl SignableAction for Login {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::LoginMessage;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("message", self.message.as_str())
            .with("timestamp", self.timestamp.to_string())
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "account": ctx.account(),
            "message": self.message,
            "timestamp": self.timestamp,
            "signature": signature,
        })
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A new order. `price` and `quantity` are integer-scaled (1e18) amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub product_id: u32,
    pub is_buy: bool,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    /// UNIX milliseconds
    pub expiration: u64,
    pub price: u128,
    pub quantity: u128,
    pub nonce: u64,
}

impl SignableAction for NewOrder {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::Order;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("subAccountId", ctx.sub_account_id.to_string())
            .with("productId", self.product_id.to_string())
            .with("isBuy", self.is_buy)
            .with("orderType", self.order_type.code().to_string())
            .with("timeInForce", self.time_in_force.code().to_string())
            .with("expiration", self.expiration.to_string())
            .with("price", self.price.to_string())
            .with("quantity", self.quantity.to_string())
            .with("nonce", self.nonce.to_string())
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "Account": ctx.account(),
            "SubAccountId": ctx.sub_account_id,
            "ProductId": self.product_id,
            "IsBuy": self.is_buy,
            "OrderType": self.order_type.code(),
            "TimeInForce": self.time_in_force.code(),
            "Expiration": self.expiration,
            "Price": self.price.to_string(),
            "Quantity": self.quantity.to_string(),
            "Nonce": self.nonce,
            "Signature": signature,
        })
    }
}

/// Cancel `id_to_cancel` and place `new_order` in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAndReplace {
    pub id_to_cancel: String,
    pub new_order: NewOrder,
}

impl SignableAction for CancelAndReplace {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::Order;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        self.new_order.to_message(ctx)
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        let mut body = self.new_order.to_body(ctx, signature);
        body["IdToCancel"] = json!(self.id_to_cancel);
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrder {
    pub product_id: u32,
    pub order_id: String,
}

impl SignableAction for CancelOrder {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::CancelOrder;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("subAccountId", ctx.sub_account_id.to_string())
            .with("productId", self.product_id.to_string())
            .with("orderId", self.order_id.as_str())
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "Account": ctx.account(),
            "SubAccountId": ctx.sub_account_id,
            "ProductId": self.product_id,
            "OrderId": self.order_id,
            "Signature": signature,
        })
    }
}

/// Cancel every open order on one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrders {
    pub product_id: u32,
}

impl SignableAction for CancelOrders {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::CancelOrders;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("subAccountId", ctx.sub_account_id.to_string())
            .with("productId", self.product_id.to_string())
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "Account": ctx.account(),
            "SubAccountId": ctx.sub_account_id,
            "ProductId": self.product_id,
            "Signature": signature,
        })
    }
}

// =============================================================================
// Account Management
// =============================================================================

/// Approve (or revoke, with `is_approved = false`) an additional signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveSigner {
    pub approved_signer: Address,
    pub is_approved: bool,
    pub nonce: u64,
}

impl SignableAction for ApproveSigner {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::ApproveSigner;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("subAccountId", ctx.sub_account_id.to_string())
            .with("approvedSigner", to_checksum(&self.approved_signer, None))
            .with("isApproved", self.is_approved)
            .with("nonce", self.nonce.to_string())
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "Account": ctx.account(),
            "SubAccountId": ctx.sub_account_id,
            "ApprovedSigner": to_checksum(&self.approved_signer, None),
            "IsApproved": self.is_approved,
            "Nonce": self.nonce,
            "Signature": signature,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdraw {
    pub asset: Address,
    pub quantity: u128,
    pub nonce: u64,
}

impl SignableAction for Withdraw {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::Withdraw;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("subAccountId", ctx.sub_account_id.to_string())
            .with("asset", to_checksum(&self.asset, None))
            .with("quantity", self.quantity.to_string())
            .with("nonce", self.nonce.to_string())
    }

    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "Account": ctx.account(),
            "SubAccountId": ctx.sub_account_id,
            "Asset": to_checksum(&self.asset, None),
            "Quantity": self.quantity.to_string(),
            "Nonce": self.nonce,
            "Signature": signature,
        })
    }
}

/// Proof of account ownership for signed GET queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedAuthentication;

impl SignableAction for SignedAuthentication {
    const PRIMARY_TYPE: PrimaryType = PrimaryType::SignedAuthentication;

    fn to_message(&self, ctx: &AccountContext) -> SignableMessage {
        SignableMessage::new()
            .with("account", ctx.account())
            .with("subAccountId", ctx.sub_account_id.to_string())
    }

    /// Rendered as query parameters, so keys are camelCase
    fn to_body(&self, ctx: &AccountContext, signature: &str) -> Value {
        json!({
            "account": ctx.account(),
            "subAccountId": ctx.sub_account_id,
            "signature": signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{recover_signer, typed_data_digest, MessageValue};

    const TEST_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const TEST_ADDR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn ctx() -> AccountContext {
        AccountContext::new(TEST_ADDR.parse().unwrap(), 1)
    }

    fn domain() -> Eip712Domain {
        Eip712Domain::new(168587773, Address::repeat_byte(0x22))
    }

    fn sample_order() -> NewOrder {
        NewOrder {
            product_id: 1002,
            is_buy: true,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Gtc,
            expiration: 1735689600000,
            price: 3_300_000_000_000_000_000_000,
            quantity: 1_000_000_000_000_000_000,
            nonce: 1735689500000,
        }
    }

    /// Both projections describe the same values: every signed field has a
    /// PascalCase body counterpart whose string form matches
    fn assert_projections_agree<A: SignableAction>(action: &A) {
        let ctx = ctx();
        let message = action.to_message(&ctx);
        let body = action.to_body(&ctx, "0xsig");

        for key in message.keys() {
            let mut chars = key.chars();
            let pascal: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => continue,
            };
            let body_value = body
                .get(&pascal)
                .unwrap_or_else(|| panic!("body missing {}", pascal));
            let body_str = match body_value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let signed_str = match message.get(key) {
                Some(MessageValue::Str(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => unreachable!(),
            };
            assert_eq!(body_str, signed_str, "projection mismatch for {}", key);
        }
        assert_eq!(body["Signature"], "0xsig");
    }

    #[test]
    fn test_order_projections_agree() {
        assert_projections_agree(&sample_order());
    }

    #[test]
    fn test_cancel_projections_agree() {
        assert_projections_agree(&CancelOrder {
            product_id: 1002,
            order_id: "0xabc".into(),
        });
        assert_projections_agree(&CancelOrders { product_id: 1002 });
    }

    #[test]
    fn test_account_management_projections_agree() {
        assert_projections_agree(&ApproveSigner {
            approved_signer: Address::repeat_byte(0x33),
            is_approved: true,
            nonce: 42,
        });
        assert_projections_agree(&Withdraw {
            asset: Address::repeat_byte(0x44),
            quantity: u128::MAX,
            nonce: 43,
        });
    }

    #[test]
    fn test_order_body_numeric_types() {
        let body = sample_order().to_body(&ctx(), "0xsig");
        assert!(body["Expiration"].is_u64());
        assert!(body["Nonce"].is_u64());
        assert!(body["SubAccountId"].is_u64());
        assert!(body["ProductId"].is_u64());
        assert!(body["OrderType"].is_u64());
        assert!(body["TimeInForce"].is_u64());
        assert!(body["IsBuy"].is_boolean());
        assert_eq!(body["Price"], "3300000000000000000000");
        assert_eq!(body["Quantity"], "1000000000000000000");
    }

    #[test]
    fn test_order_message_matches_schema() {
        let message = sample_order().to_message(&ctx());
        let digest = typed_data_digest(&domain(), PrimaryType::Order, &message);
        assert!(digest.is_ok(), "{:?}", digest);
        assert_eq!(message.len(), PrimaryType::Order.fields().len());
    }

    #[test]
    fn test_every_action_message_is_schema_complete() {
        let ctx = ctx();
        let messages = [
            (PrimaryType::LoginMessage, Login::at(1).to_message(&ctx)),
            (PrimaryType::Order, sample_order().to_message(&ctx)),
            (
                PrimaryType::CancelOrder,
                CancelOrder {
                    product_id: 1,
                    order_id: "x".into(),
                }
                .to_message(&ctx),
            ),
            (PrimaryType::CancelOrders, CancelOrders { product_id: 1 }.to_message(&ctx)),
            (
                PrimaryType::ApproveSigner,
                ApproveSigner {
                    approved_signer: Address::zero(),
                    is_approved: false,
                    nonce: 1,
                }
                .to_message(&ctx),
            ),
            (
                PrimaryType::Withdraw,
                Withdraw {
                    asset: Address::zero(),
                    quantity: 1,
                    nonce: 1,
                }
                .to_message(&ctx),
            ),
            (
                PrimaryType::SignedAuthentication,
                SignedAuthentication.to_message(&ctx),
            ),
        ];
        for (primary_type, message) in messages {
            assert!(
                typed_data_digest(&domain(), primary_type, &message).is_ok(),
                "{} message does not match its schema",
                primary_type
            );
        }
    }

    #[test]
    fn test_cancel_and_replace_body() {
        let action = CancelAndReplace {
            id_to_cancel: "0xold".into(),
            new_order: sample_order(),
        };
        let body = action.to_body(&ctx(), "0xsig");
        assert_eq!(body["IdToCancel"], "0xold");
        assert_eq!(body["ProductId"], 1002);
        assert_eq!(action.to_message(&ctx()), sample_order().to_message(&ctx()));
    }

    #[test]
    fn test_login_forward_dates_ten_seconds() {
        let login = Login::at(1_700_000_000_000);
        assert_eq!(login.timestamp, 1_700_000_010_000);
        assert_eq!(login.message, "I want to log into 100x.finance");

        let before = current_time_ms();
        let login = Login::now();
        assert!(login.timestamp >= before + 10_000);
    }

    #[test]
    fn test_sign_action_recovers_to_account() {
        let signer = AccountSigner::from_hex(TEST_KEY).unwrap();
        let ctx = AccountContext::new(signer.address(), 1);
        let order = sample_order();
        let body = sign_action(&signer, &domain(), &ctx, &order).unwrap();

        let signature = body["Signature"].as_str().unwrap();
        assert_eq!(signature.len(), 132);
        let digest = typed_data_digest(&domain(), PrimaryType::Order, &order.to_message(&ctx))
            .unwrap();
        assert_eq!(recover_signer(signature, digest).unwrap(), signer.address());
    }
}
