// Git plumbing for the backup repository.

pub mod commit;
pub mod worker;
