use anchor_lang::prelude::*;

#[error_code]
pub enum BridgeError {
    #[msg("System is disabled")]
    SystemDisabled,

    #[msg("Unauthorized authority")]
    UnauthorizedAuthority,

    #[msg("Caller is not the configured transport endpoint")]
    UnauthorizedEndpoint,

    #[msg("Source peer is not the trusted remote for this channel")]
    Unauthenticated,

    #[msg("Channel has no trusted remote configured")]
    UntrustedChannel,

    #[msg("Sequence number was already processed on this channel")]
    NonceAlreadyProcessed,

    #[msg("Sequence number skips ahead of the next expected one")]
    NonceOutOfOrder,

    #[msg("Attached fee is below the relay estimate")]
    InsufficientFee,

    #[msg("Asset has no remote mapping for this channel")]
    UnconfiguredAsset,

    #[msg("Payload length does not match the layout for its kind")]
    MalformedLength,

    #[msg("Unknown packet kind")]
    UnknownPacketKind,

    #[msg("Text is not valid UTF-8")]
    InvalidText,

    #[msg("Text exceeds maximum length")]
    TextTooLong,

    #[msg("Payload exceeds maximum size")]
    PayloadTooLarge,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Asset accounts required for release were not supplied")]
    AssetAccountsMissing,

    #[msg("Supplied mint does not match the packet asset")]
    AssetMintMismatch,

    #[msg("Recipient token account does not belong to the packet recipient")]
    RecipientMismatch,

    #[msg("Bridge lacks mint permission and holds too little of the asset")]
    MissingMintPermission,

    #[msg("Asset release failed")]
    AssetReleaseFailed,

    #[msg("Asset escrow failed")]
    AssetEscrowFailed,

    #[msg("No stored message for this key")]
    NoStoredMessage,

    #[msg("Payload does not match the stored message hash")]
    PayloadMismatch,

    #[msg("Failed message could not be persisted")]
    RetryStoreUnavailable,

    #[msg("Rent receiver is not the account that funded the record")]
    RentReceiverMismatch,

    #[msg("Sponsor cannot cover this fee")]
    InsufficientSponsorFunds,

    #[msg("Fee exceeds the sponsor per-message cap")]
    SponsorCapExceeded,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl BridgeError {
    /// Numeric code as reported in program logs, used when a failure reason
    /// has to be persisted rather than returned.
    pub fn stored_code(self) -> u32 {
        self as u32 + anchor_lang::error::ERROR_CODE_OFFSET
    }
}
