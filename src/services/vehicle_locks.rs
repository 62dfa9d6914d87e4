//! Serialización por vehículo
//!
//! Las actualizaciones de un mismo vehículo hacen leer-calcular-escribir sobre
//! su estado; un mutex por vehicle_id evita que dos workers se pisen. Vehículos
//! distintos se procesan en paralelo.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Por encima de este tamaño se purgan las entradas que nadie usa
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Default)]
pub struct VehicleLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, vehicle_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() > PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks
                .entry(vehicle_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_vehicle_is_serialized() {
        let locks = Arc::new(VehicleLocks::new());
        let guard = locks.acquire("veh_1").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("veh_1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_vehicles_do_not_block() {
        let locks = VehicleLocks::new();
        let _a = locks.acquire("veh_1").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("veh_2"))
            .await
            .expect("veh_2 must not wait for veh_1");
    }
}
