//! Shared constants and invariants

pub const DEFAULT_MOMO_BASE_URL: &str = "https://sandbox.momodeveloper.mtn.com";
pub const DEFAULT_TARGET_ENVIRONMENT: &str = "sandbox";

// Upstream headers
pub const HEADER_SUBSCRIPTION_KEY: &str = "Ocp-Apim-Subscription-Key";
pub const HEADER_TARGET_ENVIRONMENT: &str = "X-Target-Environment";
pub const HEADER_REFERENCE_ID: &str = "X-Reference-Id";

// Payment defaults
pub const DEFAULT_PARTY_ID_TYPE: &str = "MSISDN";
pub const DEFAULT_PAYER_MESSAGE: &str = "Payment request";
pub const DEFAULT_PAYEE_NOTE: &str = "Payment from mobile app";

// Proxy routes
pub const ROUTE_HEALTH: &str = "/health";
pub const ROUTE_TEST: &str = "/test";
pub const ROUTE_REQUEST_TO_PAY: &str = "/api/requesttopay";
pub const ROUTE_TRANSACTION: &str = "/api/transaction/{reference_id}";
pub const ROUTE_BALANCE: &str = "/api/balance";
pub const ROUTE_ACCOUNT_HOLDER: &str = "/api/accountholder";
pub const ROUTE_VALIDATE_ACCOUNT: &str = "/api/validate-account";

pub const RESERVED_ROUTES: [&str; 6] = [
    ROUTE_HEALTH,
    ROUTE_TEST,
    ROUTE_REQUEST_TO_PAY,
    ROUTE_BALANCE,
    ROUTE_ACCOUNT_HOLDER,
    ROUTE_VALIDATE_ACCOUNT,
];
