mod config;
mod cpu;
mod disk;
mod memory;
