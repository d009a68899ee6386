pub mod contact_client;
