//! 牌桌動作錯誤

use thiserror::Error;
use tonic::Status;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("You are not in any game")]
    NotInGame,

    #[error("Game not found")]
    GameNotFound,

    #[error("Game code required")]
    GameCodeRequired,

    #[error("Game is full")]
    GameFull,

    #[error("No game code available, try again later")]
    NoGameCodeAvailable,

    #[error("Waiting for the second player")]
    WaitingForOpponent,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("The game has ended")]
    GameFinished,

    #[error("Invalid index")]
    InvalidIndex,

    #[error("You must set aside at least one scoring die before rolling again")]
    RollWithoutSetAside,

    #[error("You cannot select a die that is already set aside")]
    SelectHeldDie,

    #[error("You must roll the dice first")]
    RollFirst,

    #[error("You must select dice before setting aside")]
    SelectBeforeSetAside,

    #[error("Select dice that are not already set aside")]
    SelectNotHeld,

    #[error("Invalid selection: all dice must score")]
    InvalidSelection,

    #[error("You have no points to bank")]
    BankNoPoints,

    #[error("You must set aside at least one combination before banking")]
    BankMustSetAside,

    #[error("Invalid dice values: {0}")]
    InvalidDice(String),
}

impl From<ActionError> for Status {
    fn from(err: ActionError) -> Self {
        let message = err.to_string();
        match err {
            ActionError::GameNotFound => Status::not_found(message),
            ActionError::NotInGame => Status::permission_denied(message),
            ActionError::GameCodeRequired
            | ActionError::InvalidIndex
            | ActionError::InvalidDice(_) => Status::invalid_argument(message),
            ActionError::NoGameCodeAvailable => Status::resource_exhausted(message),
            _ => Status::failed_precondition(message),
        }
    }
}
