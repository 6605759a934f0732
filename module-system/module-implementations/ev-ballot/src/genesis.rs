use anyhow::Result;
use ev_modules_api::{Context, Spec, WorkingSet};

use crate::Ballot;

impl<C: Context> Ballot<C> {
    pub(crate) fn init_module(
        &self,
        config: &<Self as ev_modules_api::Module>::Config,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<()> {
        self.admin.set(&config.admin, working_set);

        Ok(())
    }
}
