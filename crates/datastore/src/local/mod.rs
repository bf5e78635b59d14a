pub mod local_registrations;
