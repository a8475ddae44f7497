//! A no-op engine that matches shapes but not values.
//!
//! Useful for validating that gate scheduling, wire refcounting and gate
//! accounting compose correctly without a crypto stack or a network. Every
//! argument check of the real engine is kept; every returned value is a
//! placeholder of the right shape.

use anyhow::{Context, Result};

use crate::channel_utils::PartyId;
use crate::engine::SecretShareEngine;
use crate::errors::RuntimeError;

use super::check_same_length;

/// Shape-only engine. One per party id, no communication.
pub struct DummySecretShareEngine {
    my_id: PartyId,
    and_results: Vec<bool>,
    batch_and_results: Vec<Vec<bool>>,
    composite_and_results: Vec<Vec<bool>>,
    batch_composite_and_results: Vec<Vec<Vec<bool>>>,
    mult_results: Vec<u64>,
    batch_mult_results: Vec<Vec<u64>>,
}

impl DummySecretShareEngine {
    pub fn new(my_id: PartyId) -> Self {
        Self {
            my_id,
            and_results: vec![],
            batch_and_results: vec![],
            composite_and_results: vec![],
            batch_composite_and_results: vec![],
            mult_results: vec![],
            batch_mult_results: vec![],
        }
    }
}

impl SecretShareEngine for DummySecretShareEngine {
    fn set_input(&mut self, id: PartyId, v: Option<bool>) -> Result<bool> {
        if id == self.my_id && v.is_none() {
            return Err(
                RuntimeError::InvalidArgument("needs to provide input value".into()).into(),
            );
        }
        Ok(true)
    }

    fn set_batch_input(&mut self, _id: PartyId, v: &[bool]) -> Result<Vec<bool>> {
        Ok(v.to_vec())
    }

    fn set_integer_input(&mut self, id: PartyId, v: Option<u64>) -> Result<u64> {
        if id == self.my_id && v.is_none() {
            return Err(
                RuntimeError::InvalidArgument("needs to provide input value".into()).into(),
            );
        }
        Ok(1)
    }

    fn set_batch_integer_input(&mut self, _id: PartyId, v: &[u64]) -> Result<Vec<u64>> {
        Ok(v.to_vec())
    }

    fn compute_symmetric_xor(&self, _left: bool, _right: bool) -> bool {
        true
    }

    fn compute_batch_symmetric_xor(&self, left: &[bool], right: &[bool]) -> Result<Vec<bool>> {
        check_same_length(left, right)?;
        Ok(left.to_vec())
    }

    fn compute_asymmetric_xor(&self, _private: bool, _public: bool) -> bool {
        true
    }

    fn compute_batch_asymmetric_xor(
        &self,
        private: &[bool],
        public: &[bool],
    ) -> Result<Vec<bool>> {
        check_same_length(private, public)?;
        Ok(private.to_vec())
    }

    fn compute_symmetric_not(&self, _input: bool) -> bool {
        true
    }

    fn compute_batch_symmetric_not(&self, input: &[bool]) -> Vec<bool> {
        input.to_vec()
    }

    fn compute_asymmetric_not(&self, _input: bool) -> bool {
        true
    }

    fn compute_batch_asymmetric_not(&self, input: &[bool]) -> Vec<bool> {
        input.to_vec()
    }

    fn compute_free_and(&self, _left: bool, _right: bool) -> bool {
        true
    }

    fn compute_batch_free_and(&self, left: &[bool], right: &[bool]) -> Result<Vec<bool>> {
        check_same_length(left, right)?;
        Ok(left.to_vec())
    }

    fn compute_symmetric_plus(&self, _left: u64, _right: u64) -> u64 {
        1
    }

    fn compute_batch_symmetric_plus(&self, left: &[u64], right: &[u64]) -> Result<Vec<u64>> {
        check_same_length(left, right)?;
        Ok(left.to_vec())
    }

    fn compute_asymmetric_plus(&self, _private: u64, _public: u64) -> u64 {
        1
    }

    fn compute_batch_asymmetric_plus(&self, private: &[u64], public: &[u64]) -> Result<Vec<u64>> {
        check_same_length(private, public)?;
        Ok(private.to_vec())
    }

    fn compute_symmetric_neg(&self, _input: u64) -> u64 {
        1
    }

    fn compute_batch_symmetric_neg(&self, input: &[u64]) -> Vec<u64> {
        input.to_vec()
    }

    fn compute_free_mult(&self, _left: u64, _right: u64) -> u64 {
        1
    }

    fn compute_batch_free_mult(&self, left: &[u64], right: &[u64]) -> Result<Vec<u64>> {
        check_same_length(left, right)?;
        Ok(left.to_vec())
    }

    fn schedule_and(&mut self, _left: bool, _right: bool) -> usize {
        self.and_results.push(true);
        self.and_results.len() - 1
    }

    fn schedule_batch_and(&mut self, left: &[bool], right: &[bool]) -> Result<usize> {
        check_same_length(left, right)?;
        self.batch_and_results.push(left.to_vec());
        Ok(self.batch_and_results.len() - 1)
    }

    fn schedule_composite_and(&mut self, _left: bool, rights: Vec<bool>) -> usize {
        self.composite_and_results.push(rights);
        self.composite_and_results.len() - 1
    }

    fn schedule_batch_composite_and(
        &mut self,
        left: &[bool],
        rights: Vec<Vec<bool>>,
    ) -> Result<usize> {
        for right in &rights {
            check_same_length(left, right)?;
        }
        self.batch_composite_and_results.push(rights);
        Ok(self.batch_composite_and_results.len() - 1)
    }

    fn schedule_mult(&mut self, _left: u64, _right: u64) -> usize {
        self.mult_results.push(1);
        self.mult_results.len() - 1
    }

    fn schedule_batch_mult(&mut self, left: &[u64], right: &[u64]) -> Result<usize> {
        check_same_length(left, right)?;
        self.batch_mult_results.push(left.to_vec());
        Ok(self.batch_mult_results.len() - 1)
    }

    fn execute_scheduled_operations(&mut self) -> Result<()> {
        Ok(())
    }

    fn compute_batch_and_immediately(
        &mut self,
        left: &[bool],
        right: &[bool],
    ) -> Result<Vec<bool>> {
        check_same_length(left, right)?;
        Ok(left.to_vec())
    }

    fn compute_batch_mult_immediately(&mut self, left: &[u64], right: &[u64]) -> Result<Vec<u64>> {
        check_same_length(left, right)?;
        Ok(left.to_vec())
    }

    fn and_execution_result(&self, index: usize) -> Result<bool> {
        self.and_results
            .get(index)
            .copied()
            .with_context(|| format!("no AND result at index {}", index))
    }

    fn batch_and_execution_result(&self, index: usize) -> Result<&Vec<bool>> {
        self.batch_and_results
            .get(index)
            .with_context(|| format!("no batch AND result at index {}", index))
    }

    fn composite_and_execution_result(&self, index: usize) -> Result<&Vec<bool>> {
        self.composite_and_results
            .get(index)
            .with_context(|| format!("no composite AND result at index {}", index))
    }

    fn batch_composite_and_execution_result(&self, index: usize) -> Result<&Vec<Vec<bool>>> {
        self.batch_composite_and_results
            .get(index)
            .with_context(|| format!("no batch composite AND result at index {}", index))
    }

    fn mult_execution_result(&self, index: usize) -> Result<u64> {
        self.mult_results
            .get(index)
            .copied()
            .with_context(|| format!("no Mult result at index {}", index))
    }

    fn batch_mult_execution_result(&self, index: usize) -> Result<&Vec<u64>> {
        self.batch_mult_results
            .get(index)
            .with_context(|| format!("no batch Mult result at index {}", index))
    }

    fn reveal_to_party_bool(&mut self, _id: PartyId, shares: &[bool]) -> Result<Vec<bool>> {
        Ok(shares.to_vec())
    }

    fn reveal_to_party_u64(&mut self, _id: PartyId, shares: &[u64]) -> Result<Vec<u64>> {
        Ok(shares.to_vec())
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        (0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        let mut engine = DummySecretShareEngine::new(0);

        assert!(engine.set_input(1, None).is_ok());
        assert!(engine.set_input(0, None).is_err());

        let i = engine.schedule_batch_and(&[true, false], &[false, false]).unwrap();
        engine.execute_scheduled_operations().unwrap();
        assert_eq!(engine.batch_and_execution_result(i).unwrap().len(), 2);

        assert!(engine
            .schedule_batch_composite_and(&[true], vec![vec![true, false]])
            .is_err());
    }
}
