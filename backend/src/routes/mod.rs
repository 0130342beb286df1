pub(crate) mod health;
pub(crate) mod auth;
pub(crate) mod favorites;
pub(crate) mod prices;
