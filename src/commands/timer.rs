//! Timers
//!
//! Browser-backed `Sleep` for receipt polling.

use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use task_dapp_core::Sleep;

pub fn browser_sleep() -> Sleep {
    Rc::new(|delay: Duration| -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(delay))
    })
}
