//! Migration
//!
//! Migrators exchange individuals between concurrently evolving populations (islands).
//! The engine calls its migrator once per generation, right after replacement.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};

use rand::{Rng, RngCore};
use tracing::{debug, trace};

use crate::error::EvoResult;
use crate::operators::traits::Migrator;
use crate::options::Options;
use crate::population::individual::Individual;

/// Migrator that leaves the population unchanged
#[derive(Clone, Debug, Default)]
pub struct DefaultMigrator;

impl<C> Migrator<C> for DefaultMigrator {
    fn migrate(
        &mut self,
        _rng: &mut dyn RngCore,
        population: Vec<Individual<C>>,
        _next_birth_index: &mut usize,
        _options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        Ok(population)
    }
}

/// Island migrator over bounded in-process channels
///
/// Each call picks a random member, replaces it with a waiting migrant if there is one,
/// and sends the displaced member to the next island. Sending and receiving never block:
/// a full outbox drops the emigrant and an empty inbox leaves the population as is.
/// With `evaluate_migrant` the immigrant's fitness is cleared so the engine re-evaluates it.
/// Immigrants are renumbered from the receiving island's birth counter.
#[derive(Debug)]
pub struct ChannelMigrator<C> {
    inbox: Receiver<Individual<C>>,
    outbox: SyncSender<Individual<C>>,
}

impl<C> ChannelMigrator<C> {
    /// Create a migrator from its receiving and sending ends
    pub fn new(inbox: Receiver<Individual<C>>, outbox: SyncSender<Individual<C>>) -> Self {
        Self { inbox, outbox }
    }

    /// Wire `n` migrators into a ring; island `i` sends to island `i + 1`
    ///
    /// Each channel holds at most `capacity` individuals in flight.
    pub fn ring(n: usize, capacity: usize) -> Vec<Self> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..n).map(|_| sync_channel(capacity)).unzip();

        // Island i receives on channel i and sends on channel i + 1
        let mut senders = senders.into_iter().cycle().skip(1);
        receivers
            .into_iter()
            .filter_map(|inbox| senders.next().map(|outbox| Self::new(inbox, outbox)))
            .collect()
    }
}

impl<C: Clone> Migrator<C> for ChannelMigrator<C> {
    fn migrate(
        &mut self,
        rng: &mut dyn RngCore,
        mut population: Vec<Individual<C>>,
        next_birth_index: &mut usize,
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        if population.is_empty() {
            return Ok(population);
        }

        let slot = rng.gen_range(0..population.len());
        let emigrant = population[slot].clone();

        match self.inbox.try_recv() {
            Ok(mut immigrant) => {
                if options.evaluate_migrant {
                    immigrant.clear_fitness();
                }
                immigrant.birth_index = *next_birth_index;
                *next_birth_index += 1;
                immigrant.maximize = population[slot].maximize;
                trace!(slot, birth_index = immigrant.birth_index, "immigrant received");
                population[slot] = immigrant;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => debug!("migration inbox disconnected"),
        }

        match self.outbox.try_send(emigrant) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => trace!("migration outbox full; emigrant dropped"),
            Err(TrySendError::Disconnected(_)) => debug!("migration outbox disconnected"),
        }

        Ok(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::Fitness;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn island(value: f64, size: usize) -> Vec<Individual<Vec<f64>>> {
        (0..size)
            .map(|i| Individual::with_fitness(vec![value], Fitness::Scalar(value), i, true))
            .collect()
    }

    #[test]
    fn test_default_migrator_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut births = 10;
        let population = island(1.0, 3);
        let migrated = DefaultMigrator
            .migrate(&mut rng, population.clone(), &mut births, &Options::default())
            .unwrap();
        assert_eq!(migrated, population);
    }

    #[test]
    fn test_ring_exchanges_individuals() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut births = 10;
        let mut ring = ChannelMigrator::ring(2, 4);
        assert_eq!(ring.len(), 2);
        let options = Options::default();

        // Island 0 has nothing to receive yet but sends to island 1
        let a = ring[0].migrate(&mut rng, island(1.0, 3), &mut births, &options).unwrap();
        assert!(a.iter().all(|i| i.candidate == vec![1.0]));

        let b = ring[1].migrate(&mut rng, island(2.0, 3), &mut births, &options).unwrap();
        assert_eq!(b.len(), 3);
        assert_eq!(b.iter().filter(|i| i.candidate == vec![1.0]).count(), 1);

        // Island 1 sent one of its own members back to island 0
        let a = ring[0].migrate(&mut rng, a, &mut births, &options).unwrap();
        assert_eq!(a.iter().filter(|i| i.candidate == vec![2.0]).count(), 1);
    }

    #[test]
    fn test_evaluate_migrant_clears_fitness() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut births = 10;
        let mut ring = ChannelMigrator::ring(2, 1);
        let options = Options::default().with_evaluate_migrant(true);

        ring[0].migrate(&mut rng, island(1.0, 2), &mut births, &options).unwrap();
        let b = ring[1].migrate(&mut rng, island(2.0, 2), &mut births, &options).unwrap();
        assert_eq!(b.iter().filter(|i| !i.is_evaluated()).count(), 1);
    }

    #[test]
    fn test_immigrants_take_local_birth_index() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut births = 10;
        let mut ring = ChannelMigrator::ring(2, 1);
        let options = Options::default();

        ring[0].migrate(&mut rng, island(1.0, 2), &mut births, &options).unwrap();
        assert_eq!(births, 10);

        let mut other_births = 50;
        let b = ring[1]
            .migrate(&mut rng, island(2.0, 2), &mut other_births, &options)
            .unwrap();
        let immigrant = b.iter().find(|i| i.candidate == vec![1.0]).unwrap();
        assert_eq!(immigrant.birth_index, 50);
        assert!(immigrant.is_evaluated());
        assert_eq!(other_births, 51);
    }

    #[test]
    fn test_full_outbox_does_not_block() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut births = 10;
        let mut ring = ChannelMigrator::ring(2, 1);
        let options = Options::default();
        for _ in 0..5 {
            let population = ring[0].migrate(&mut rng, island(1.0, 2), &mut births, &options).unwrap();
            assert_eq!(population.len(), 2);
        }
    }

    #[test]
    fn test_single_island_ring_sends_to_itself() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut births = 10;
        let mut ring = ChannelMigrator::ring(1, 1);
        let options = Options::default();
        ring[0].migrate(&mut rng, island(1.0, 2), &mut births, &options).unwrap();
        let population = ring[0].migrate(&mut rng, island(2.0, 2), &mut births, &options).unwrap();
        assert_eq!(population.iter().filter(|i| i.candidate == vec![1.0]).count(), 1);
    }
}
