use anyhow::Result;
use ev_modules_api::{Context, Spec, WorkingSet};

use crate::VoterRegistry;

impl<C: Context> VoterRegistry<C> {
    pub(crate) fn init_module(
        &self,
        config: &<Self as ev_modules_api::Module>::Config,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<()> {
        self.admin.set(&config.admin, working_set);
        self.voter_count.set(&0, working_set);

        Ok(())
    }
}
