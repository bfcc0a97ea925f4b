mod application;
mod presentation;

use projd_core::Result;

fn main() -> Result<()> {
    application::run()
}
