pub mod cvss3;
