mod health_check;
mod helpers;
mod login;
mod merchant_profile;
mod password_reset;
mod register;
mod verify_email;
