use crate::errors::GameError;

/// The ledger contract consumed by every round state machine.
///
/// A round debits the stake exactly once before play begins and credits the
/// payout exactly once at resolution (zero on a loss). Implementations must
/// never let the balance go negative; `debit` fails instead.
pub trait Wallet {
    fn is_connected(&self) -> bool;
    fn balance(&self) -> u64;
    fn debit(&mut self, amount: u64) -> Result<(), GameError>;
    fn credit(&mut self, amount: u64) -> Result<(), GameError>;
}

/// In-memory chip wallet with an explicit connect/disconnect gate.
///
/// Stands in for the external wallet adapter: all any game sees is a chip
/// balance and a connected flag. A disconnected wallet blocks every bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipWallet {
    connected: bool,
    chips: u64,
}

impl ChipWallet {
    /// Creates a connected wallet holding `chips`.
    pub fn new(chips: u64) -> Self {
        Self {
            connected: true,
            chips,
        }
    }

    /// Creates a wallet that must be connected before it can be used.
    pub fn disconnected(chips: u64) -> Self {
        Self {
            connected: false,
            chips,
        }
    }

    pub fn connect(&mut self) {
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl Wallet for ChipWallet {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn balance(&self) -> u64 {
        self.chips
    }

    fn debit(&mut self, amount: u64) -> Result<(), GameError> {
        if !self.connected {
            return Err(GameError::NotConnected);
        }
        match self.chips.checked_sub(amount) {
            Some(rest) => {
                self.chips = rest;
                Ok(())
            }
            None => Err(GameError::InsufficientBalance {
                required: amount,
                available: self.chips,
            }),
        }
    }

    fn credit(&mut self, amount: u64) -> Result<(), GameError> {
        if !self.connected {
            return Err(GameError::NotConnected);
        }
        self.chips = self.chips.saturating_add(amount);
        Ok(())
    }
}
